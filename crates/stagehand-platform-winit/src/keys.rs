//! Key codes carried by [`stagehand_core::EngineEvent::Key`].

use winit::keyboard::{KeyCode, PhysicalKey};

pub const UNKNOWN: u32 = 0;
pub const ESCAPE: u32 = 1;
pub const ENTER: u32 = 2;
pub const SPACE: u32 = 3;
pub const TAB: u32 = 4;
pub const BACKSPACE: u32 = 5;
pub const ARROW_UP: u32 = 6;
pub const ARROW_DOWN: u32 = 7;
pub const ARROW_LEFT: u32 = 8;
pub const ARROW_RIGHT: u32 = 9;
pub const P: u32 = 10;
pub const F1: u32 = 11;

pub fn map_physical_key(key: &PhysicalKey) -> u32 {
    let PhysicalKey::Code(code) = key else {
        return UNKNOWN;
    };
    match code {
        KeyCode::Escape => ESCAPE,
        KeyCode::Enter | KeyCode::NumpadEnter => ENTER,
        KeyCode::Space => SPACE,
        KeyCode::Tab => TAB,
        KeyCode::Backspace => BACKSPACE,
        KeyCode::ArrowUp => ARROW_UP,
        KeyCode::ArrowDown => ARROW_DOWN,
        KeyCode::ArrowLeft => ARROW_LEFT,
        KeyCode::ArrowRight => ARROW_RIGHT,
        KeyCode::KeyP => P,
        KeyCode::F1 => F1,
        _ => UNKNOWN,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::keyboard::NativeKeyCode;

    fn code(key: KeyCode) -> u32 {
        map_physical_key(&PhysicalKey::Code(key))
    }

    #[test]
    fn maps_known_and_unknown_keys() {
        assert_eq!(code(KeyCode::Escape), ESCAPE);
        assert_eq!(code(KeyCode::NumpadEnter), ENTER);
        assert_eq!(code(KeyCode::KeyZ), UNKNOWN);
        assert_eq!(
            map_physical_key(&PhysicalKey::Unidentified(NativeKeyCode::Unidentified)),
            UNKNOWN
        );
    }
}
