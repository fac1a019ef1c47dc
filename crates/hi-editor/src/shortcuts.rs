//! Keyboard shortcut mapping for the location view.
//!
//! Maps key + modifier combos to semantic `ShortcutAction`s. Both transform
//! controllers share this map; what an action means depends on which one
//! claims it and on its current mode.
//!
//! - `s` = scale mode, `r` = rotate mode
//! - `+` / `-` = zoom in/out, or rotate in rotate mode
//! - Escape = abort the current scale/rotate and revert

/// Actions that keyboard shortcuts can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    EnterScaleMode,
    EnterRotateMode,
    /// Zoom in, or rotate clockwise in rotate mode.
    Increase,
    /// Zoom out, or rotate counter-clockwise in rotate mode.
    Decrease,
    Abort,
}

/// How single-pointer movement is interpreted for the selected target.
///
/// `Scale` and `Rotate` are entered from the keyboard and left on
/// pointer-up (commit) or Escape (revert).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GestureMode {
    #[default]
    Move,
    Scale,
    Rotate,
}

/// Resolves key events into shortcut actions.
pub struct ShortcutMap;

impl ShortcutMap {
    /// Resolve a key event to an action.
    ///
    /// `key` is the `KeyboardEvent.key` value (e.g. `"s"`, `"Escape"`).
    /// Anything held with Ctrl or ⌘ is left to the browser.
    pub fn resolve(
        key: &str,
        ctrl: bool,
        _shift: bool,
        _alt: bool,
        meta: bool,
    ) -> Option<ShortcutAction> {
        if ctrl || meta {
            return None;
        }

        match key {
            "s" | "S" => Some(ShortcutAction::EnterScaleMode),
            "r" | "R" => Some(ShortcutAction::EnterRotateMode),
            // "=" is unshifted "+" on US layouts
            "+" | "=" => Some(ShortcutAction::Increase),
            "-" | "_" => Some(ShortcutAction::Decrease),
            "Escape" => Some(ShortcutAction::Abort),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_mode_keys() {
        assert_eq!(
            ShortcutMap::resolve("s", false, false, false, false),
            Some(ShortcutAction::EnterScaleMode)
        );
        assert_eq!(
            ShortcutMap::resolve("R", false, true, false, false),
            Some(ShortcutAction::EnterRotateMode)
        );
    }

    #[test]
    fn resolve_plus_minus() {
        assert_eq!(
            ShortcutMap::resolve("+", false, true, false, false),
            Some(ShortcutAction::Increase)
        );
        assert_eq!(
            ShortcutMap::resolve("=", false, false, false, false),
            Some(ShortcutAction::Increase)
        );
        assert_eq!(
            ShortcutMap::resolve("-", false, false, false, false),
            Some(ShortcutAction::Decrease)
        );
    }

    #[test]
    fn resolve_escape() {
        assert_eq!(
            ShortcutMap::resolve("Escape", false, false, false, false),
            Some(ShortcutAction::Abort)
        );
    }

    #[test]
    fn browser_shortcuts_pass_through() {
        assert_eq!(ShortcutMap::resolve("s", true, false, false, false), None);
        assert_eq!(ShortcutMap::resolve("r", false, false, false, true), None);
        assert_eq!(ShortcutMap::resolve("-", true, false, false, false), None);
    }

    #[test]
    fn resolve_unknown_key() {
        assert_eq!(ShortcutMap::resolve("q", false, false, false, false), None);
        assert_eq!(ShortcutMap::resolve("7", false, false, false, false), None);
    }
}
