use crate::catalog::LineId;
use crate::constants::SWIPE_DEAD_ZONE;
use crate::controller::{Intent, LaneShift};

// Parses KeyboardEvent.code such as "ArrowLeft" or "NumpadEnter".
// Restart keys only count once the run is over.
#[must_use]
pub fn key_to_intent(code: &str, is_over: bool) -> Option<Intent> {
    match code {
        "ArrowLeft" | "KeyA" => Some(Intent::ShiftLane {
            direction: LaneShift::Left,
        }),
        "ArrowRight" | "KeyD" => Some(Intent::ShiftLane {
            direction: LaneShift::Right,
        }),
        "Enter" | "NumpadEnter" if is_over => Some(Intent::Restart),
        _ => None,
    }
}

// Horizontal swipe delta; anything inside the dead zone is a tap.
#[must_use]
pub fn classify_swipe(dx: f32) -> Option<LaneShift> {
    if !dx.is_finite() || dx.abs() <= SWIPE_DEAD_ZONE {
        return None;
    }
    if dx < 0.0 {
        Some(LaneShift::Left)
    } else {
        Some(LaneShift::Right)
    }
}

// A tap or press anywhere restarts a finished run and does nothing otherwise.
#[must_use]
pub fn tap_intent(is_over: bool) -> Option<Intent> {
    is_over.then_some(Intent::Restart)
}

// Line picker shortcut: "Digit1" / "Numpad1" choose the first listed line.
#[must_use]
pub fn line_choice_from_code(code: &str, lines: &[LineId]) -> Option<Intent> {
    let digit = code.chars().last()?.to_digit(10)?;
    if !(code.starts_with("Digit") || code.starts_with("Numpad")) || digit == 0 {
        return None;
    }
    let index = usize::try_from(digit - 1).ok()?;
    lines
        .get(index)
        .map(|line| Intent::SelectLine { line: line.clone() })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arrow_keys_shift_lanes() {
        assert_eq!(
            key_to_intent("ArrowLeft", false),
            Some(Intent::ShiftLane {
                direction: LaneShift::Left
            })
        );
        assert_eq!(
            key_to_intent("KeyD", true),
            Some(Intent::ShiftLane {
                direction: LaneShift::Right
            })
        );
        assert_eq!(key_to_intent("Space", false), None);
    }

    #[test]
    fn enter_restarts_only_when_over() {
        assert_eq!(key_to_intent("Enter", false), None);
        assert_eq!(key_to_intent("NumpadEnter", true), Some(Intent::Restart));
        assert_eq!(tap_intent(true), Some(Intent::Restart));
        assert_eq!(tap_intent(false), None);
    }

    #[test]
    fn swipes_respect_the_dead_zone() {
        assert_eq!(classify_swipe(-31.0), Some(LaneShift::Left));
        assert_eq!(classify_swipe(45.0), Some(LaneShift::Right));
        assert_eq!(classify_swipe(30.0), None);
        assert_eq!(classify_swipe(-12.0), None);
        assert_eq!(classify_swipe(f32::NAN), None);
    }

    #[test]
    fn digit_codes_pick_lines() {
        let lines = vec![LineId::new("Central"), LineId::new("Harbour")];
        assert_eq!(
            line_choice_from_code("Digit2", &lines),
            Some(Intent::SelectLine {
                line: LineId::new("Harbour")
            })
        );
        assert_eq!(
            line_choice_from_code("Numpad1", &lines),
            Some(Intent::SelectLine {
                line: LineId::new("Central")
            })
        );
        assert_eq!(line_choice_from_code("Digit3", &lines), None);
        assert_eq!(line_choice_from_code("Digit0", &lines), None);
        assert_eq!(line_choice_from_code("KeyA", &lines), None);
    }
}
