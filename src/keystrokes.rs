//! Keystroke cost classification.
//!
//! A character is weighted by the number of physical key presses needed to
//! produce it on a US layout: shifted symbols on the number row take a
//! modifier plus a reach, so `%` counts as 3 while `a` counts as 1. The
//! weights feed the "normalized" speed figures.

// count as 2 keystrokes
const TWO_KEYSTROKES: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ1234567890`-={}:\"|<>?";
// count as 3 keystrokes
const THREE_KEYSTROKES: &str = "~!@#$%^&*()_+";

/// How many keystrokes a single character counts as.
///
/// Total over all of Unicode: anything not in the two tables above
/// (lowercase letters, space, remaining punctuation, non-ASCII) is 1.
pub fn keystroke_cost(c: char) -> u32 {
    if THREE_KEYSTROKES.contains(c) {
        3
    } else if TWO_KEYSTROKES.contains(c) {
        2
    } else {
        1
    }
}

/// Summed keystroke cost of a whole string.
pub fn keystrokes(text: &str) -> u32 {
    text.chars().map(keystroke_cost).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercase_and_space_cost_one() {
        for c in "abcdefghijklmnopqrstuvwxyz ".chars() {
            assert_eq!(keystroke_cost(c), 1, "cost of {c:?}");
        }
    }

    #[test]
    fn unshifted_punctuation_costs_one() {
        for c in "[];'\\/.,".chars() {
            assert_eq!(keystroke_cost(c), 1, "cost of {c:?}");
        }
    }

    #[test]
    fn uppercase_and_digits_cost_two() {
        for c in "AZQ0159".chars() {
            assert_eq!(keystroke_cost(c), 2, "cost of {c:?}");
        }
        for c in "`-={}:\"|<>?".chars() {
            assert_eq!(keystroke_cost(c), 2, "cost of {c:?}");
        }
    }

    #[test]
    fn shifted_number_row_costs_three() {
        for c in "~!@#$%^&*()_+".chars() {
            assert_eq!(keystroke_cost(c), 3, "cost of {c:?}");
        }
    }

    #[test]
    fn non_ascii_defaults_to_one() {
        assert_eq!(keystroke_cost('é'), 1);
        assert_eq!(keystroke_cost('š'), 1);
        assert_eq!(keystroke_cost('€'), 1);
    }

    #[test]
    fn string_cost_is_summed() {
        // 'H' = 2, 'i' = 1, '!' = 3
        assert_eq!(keystrokes("Hi!"), 6);
        assert_eq!(keystrokes(""), 0);
    }
}
