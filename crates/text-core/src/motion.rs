/// Granularity for motion and boundary queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    Buffer,
    Line,
    Word,
    Char,
}

/// Coarse character classes for word motion. A word is a run of one
/// class; blanks between runs get skipped on the way forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CharClass {
    Blank,
    Word,
    Punct,
}

fn class_of(ch: char) -> CharClass {
    if ch.is_whitespace() {
        CharClass::Blank
    } else if ch.is_alphanumeric() || ch == '_' {
        CharClass::Word
    } else {
        CharClass::Punct
    }
}

/*

==================================
====== BOUNDARY & MOTION =========
==================================

Word motion:
                     forward             backward
 th|is is a word.    this |is a word.    |this is a word.
 this |is a word.    this is| a word.    |this is a word.

*/

impl crate::buffer::Buffer {
    /// Computes the start position of the unit containing `offset`.
    pub fn start_of(&self, unit: Unit, offset: usize) -> crate::errors::TextResult<usize> {
        self.check_offset(offset)?;
        let position = match unit {
            Unit::Buffer => 0,
            Unit::Char => offset,
            Unit::Line => {
                let mut position = offset;
                while position > 0 {
                    position -= 1;
                    if self.char_at(position)? == '\n' {
                        position += 1;
                        break;
                    }
                }
                position
            }
            Unit::Word => {
                let Some(first) = self.storage().char_at(offset) else {
                    return Ok(offset);
                };
                let class = class_of(first);
                if class == CharClass::Blank {
                    // Already between words.
                    return Ok(offset);
                }
                let mut position = offset;
                while position > 0
                    && let Some(previous) = self.storage().char_at(position - 1)
                    && class_of(previous) == class
                {
                    position -= 1;
                }
                position
            }
        };
        Ok(position)
    }

    /// Computes the end position of the unit containing `offset`.
    pub fn end_of(&self, unit: Unit, offset: usize) -> crate::errors::TextResult<usize> {
        self.check_offset(offset)?;
        let position = match unit {
            Unit::Buffer => self.len(),
            Unit::Char => offset,
            Unit::Line => {
                let mut position = offset;
                while position < self.len() {
                    if self.char_at(position)? == '\n' {
                        break;
                    }
                    position += 1;
                }
                position
            }
            Unit::Word => {
                let Some(first) = self.storage().char_at(offset) else {
                    return Ok(self.len());
                };
                let class = class_of(first);
                if class == CharClass::Blank {
                    return Ok(offset);
                }
                let mut position = offset;
                while let Some(current) = self.storage().char_at(position)
                    && class_of(current) == class
                {
                    position += 1;
                }
                position
            }
        };
        Ok(position)
    }

    /// Moves `count` units from `offset` (negative moves backward) and
    /// returns `(units_moved, new_offset)`. Movement stops early at the
    /// buffer edges.
    pub fn motion(
        &self,
        unit: Unit,
        count: isize,
        offset: usize,
    ) -> crate::errors::TextResult<(usize, usize)> {
        self.check_offset(offset)?;
        match unit {
            Unit::Buffer => {
                let target = match count.cmp(&0) {
                    std::cmp::Ordering::Greater => self.len(),
                    std::cmp::Ordering::Less => 0,
                    std::cmp::Ordering::Equal => offset,
                };
                Ok((usize::from(target != offset), target))
            }
            Unit::Char => Ok(self.char_motion(count, offset)),
            Unit::Line => self.line_motion(count, offset),
            Unit::Word => Ok(self.word_motion(count, offset)),
        }
    }

    fn check_offset(&self, offset: usize) -> crate::errors::TextResult<()> {
        if offset > self.len() {
            return Err(crate::errors::TextError::OffsetOutOfBounds {
                offset,
                len: self.len(),
            });
        }
        Ok(())
    }

    fn char_motion(&self, count: isize, offset: usize) -> (usize, usize) {
        if count > 0 {
            let target = self.len().min(offset + count.unsigned_abs());
            (target - offset, target)
        } else {
            let target = offset.saturating_sub(count.unsigned_abs());
            (offset - target, target)
        }
    }

    fn line_motion(&self, count: isize, offset: usize) -> crate::errors::TextResult<(usize, usize)> {
        let mut position = offset;
        let mut moved = 0;
        if count > 0 {
            while moved < count.unsigned_abs() {
                position = self.end_of(Unit::Line, position)?;
                moved += 1;
                if position == self.len() {
                    break;
                }
                position += 1;
            }
        } else {
            while moved < count.unsigned_abs() {
                position = self.start_of(Unit::Line, position)?;
                moved += 1;
                if position == 0 {
                    break;
                }
                position -= 1;
            }
        }
        Ok((moved, position))
    }

    fn word_motion(&self, count: isize, offset: usize) -> (usize, usize) {
        let mut position = offset;
        let mut moved = 0;
        if count > 0 {
            while moved < count.unsigned_abs() && position < self.len() {
                let class = self
                    .storage()
                    .char_at(position)
                    .map_or(CharClass::Blank, class_of);
                // Skip the current run, then any blanks after it.
                while let Some(current) = self.storage().char_at(position)
                    && class_of(current) == class
                {
                    position += 1;
                }
                while let Some(current) = self.storage().char_at(position)
                    && class_of(current) == CharClass::Blank
                {
                    position += 1;
                }
                moved += 1;
            }
        } else {
            while moved < count.unsigned_abs() && position > 0 {
                position -= 1;
                // Skip blanks backward to the previous run's last char.
                while position > 0
                    && self
                        .storage()
                        .char_at(position)
                        .is_some_and(|current| class_of(current) == CharClass::Blank)
                {
                    position -= 1;
                }
                let class = self
                    .storage()
                    .char_at(position)
                    .map_or(CharClass::Blank, class_of);
                while position > 0
                    && self
                        .storage()
                        .char_at(position - 1)
                        .is_some_and(|previous| class_of(previous) == class)
                {
                    position -= 1;
                }
                moved += 1;
            }
        }
        (moved, position)
    }
}

#[cfg(test)]
mod motion_tests {
    use super::*;
    use crate::buffer::Buffer;

    #[test]
    fn test_line_boundaries() {
        let buffer = Buffer::with_text("scratch", "one\ntwo\nthree");

        assert_eq!(buffer.start_of(Unit::Line, 5).unwrap(), 4);
        assert_eq!(buffer.end_of(Unit::Line, 5).unwrap(), 7);
        assert_eq!(buffer.start_of(Unit::Line, 0).unwrap(), 0);
        assert_eq!(buffer.end_of(Unit::Line, 13).unwrap(), 13);

        // Sitting on the newline itself belongs to the line before it.
        assert_eq!(buffer.start_of(Unit::Line, 3).unwrap(), 0);
        assert_eq!(buffer.end_of(Unit::Line, 3).unwrap(), 3);
    }

    #[test]
    fn test_buffer_boundaries() {
        let buffer = Buffer::with_text("scratch", "abc");

        assert_eq!(buffer.start_of(Unit::Buffer, 2).unwrap(), 0);
        assert_eq!(buffer.end_of(Unit::Buffer, 2).unwrap(), 3);
    }

    #[test]
    fn test_word_boundaries() {
        let buffer = Buffer::with_text("scratch", "this is a word.");

        assert_eq!(buffer.start_of(Unit::Word, 2).unwrap(), 0);
        assert_eq!(buffer.end_of(Unit::Word, 2).unwrap(), 4);
        assert_eq!(
            buffer.start_of(Unit::Word, 4).unwrap(),
            4,
            "on a blank both boundaries stay put"
        );
        assert_eq!(buffer.end_of(Unit::Word, 4).unwrap(), 4);
        assert_eq!(buffer.end_of(Unit::Word, 14).unwrap(), 15, "punctuation is its own run");
    }

    #[test]
    fn test_word_motion_matches_the_table() {
        let buffer = Buffer::with_text("scratch", "this is a word.");

        // th|is -> this |is
        assert_eq!(buffer.motion(Unit::Word, 1, 2).unwrap(), (1, 5));
        // this |is -> this is |a: the trailing blank is consumed, so the
        // caret lands on the next word start.
        assert_eq!(buffer.motion(Unit::Word, 1, 5).unwrap(), (1, 8));

        // th|is -> |this
        assert_eq!(buffer.motion(Unit::Word, -1, 2).unwrap(), (1, 0));
        // this |is -> |this
        assert_eq!(buffer.motion(Unit::Word, -1, 5).unwrap(), (1, 0));
    }

    #[test]
    fn test_word_motion_stops_at_edges() {
        let buffer = Buffer::with_text("scratch", "ab cd");

        assert_eq!(buffer.motion(Unit::Word, 5, 0).unwrap(), (2, 5));
        assert_eq!(buffer.motion(Unit::Word, -5, 5).unwrap(), (2, 0));
        assert_eq!(buffer.motion(Unit::Word, 1, 5).unwrap(), (0, 5));
        assert_eq!(buffer.motion(Unit::Word, -1, 0).unwrap(), (0, 0));
    }

    #[test]
    fn test_char_motion_clamps() {
        let buffer = Buffer::with_text("scratch", "abc");

        assert_eq!(buffer.motion(Unit::Char, 2, 1).unwrap(), (2, 3));
        assert_eq!(buffer.motion(Unit::Char, 9, 1).unwrap(), (2, 3));
        assert_eq!(buffer.motion(Unit::Char, -9, 2).unwrap(), (2, 0));
        assert_eq!(buffer.motion(Unit::Char, 0, 2).unwrap(), (0, 2));
    }

    #[test]
    fn test_line_motion() {
        let buffer = Buffer::with_text("scratch", "one\ntwo\nthree");

        assert_eq!(buffer.motion(Unit::Line, 1, 1).unwrap(), (1, 4));
        assert_eq!(buffer.motion(Unit::Line, 2, 0).unwrap(), (2, 8));
        assert_eq!(buffer.motion(Unit::Line, 9, 0).unwrap().1, 13);

        // Backward lands on the previous line's newline.
        assert_eq!(buffer.motion(Unit::Line, -1, 5).unwrap(), (1, 3));
    }

    #[test]
    fn test_motion_validates_offset() {
        let buffer = Buffer::with_text("scratch", "abc");

        assert!(buffer.motion(Unit::Word, 1, 9).is_err());
        assert!(buffer.start_of(Unit::Line, 9).is_err());
    }
}
