use alloc::vec::Vec;

/// Keys of the 4x4 membrane keypad.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PhysicalKey {
    Digit(char),
    Star,
    Hash,
    A,
    B,
    C,
    D,
}

impl PhysicalKey {
    /// Map the character a keypad driver reports for a key.
    pub fn from_char(ch: char) -> Option<Self> {
        match ch {
            '0'..='9' => Some(PhysicalKey::Digit(ch)),
            '*' => Some(PhysicalKey::Star),
            '#' => Some(PhysicalKey::Hash),
            'A' | 'a' => Some(PhysicalKey::A),
            'B' | 'b' => Some(PhysicalKey::B),
            'C' | 'c' => Some(PhysicalKey::C),
            'D' | 'd' => Some(PhysicalKey::D),
            _ => None,
        }
    }
}

/// What a key press asks the door to do.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DoorCommand {
    InsertDigit(char),
    Clear,
    OpenTimezoneSetup,
    IncreaseOffset,
    DecreaseOffset,
    SaveTimezone,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Binding {
    key: PhysicalKey,
    command: DoorCommand,
}

/// Translation from keypad keys to door commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Keymap {
    bindings: Vec<Binding>,
}

impl Default for Keymap {
    fn default() -> Self {
        let mut map = Self {
            bindings: Vec::new(),
        };
        map.add_binding(PhysicalKey::Star, DoorCommand::Clear);
        map.add_binding(PhysicalKey::A, DoorCommand::OpenTimezoneSetup);
        map.add_binding(PhysicalKey::B, DoorCommand::IncreaseOffset);
        map.add_binding(PhysicalKey::C, DoorCommand::DecreaseOffset);
        map.add_binding(PhysicalKey::D, DoorCommand::SaveTimezone);
        map
    }
}

impl Keymap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or override a binding.
    pub fn add_binding(&mut self, key: PhysicalKey, command: DoorCommand) {
        if let Some(existing) = self.bindings.iter_mut().find(|binding| binding.key == key) {
            existing.command = command;
        } else {
            self.bindings.push(Binding { key, command });
        }
    }

    /// Resolve a command for a key press. Unbound non-digit keys yield `None`.
    pub fn resolve(&self, key: PhysicalKey) -> Option<DoorCommand> {
        if let Some(binding) = self.bindings.iter().find(|binding| binding.key == key) {
            return Some(binding.command);
        }

        match key {
            PhysicalKey::Digit(digit) => Some(DoorCommand::InsertDigit(digit)),
            _ => None,
        }
    }
}

/// Keypad scanner.
pub trait Keypad {
    /// Wait up to `timeout_ms` for a key press.
    fn read_key(&mut self, timeout_ms: u32) -> Option<PhysicalKey>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_layout_matches_keypad_legend() {
        let keymap = Keymap::new();
        assert_eq!(keymap.resolve(PhysicalKey::Star), Some(DoorCommand::Clear));
        assert_eq!(
            keymap.resolve(PhysicalKey::A),
            Some(DoorCommand::OpenTimezoneSetup)
        );
        assert_eq!(
            keymap.resolve(PhysicalKey::D),
            Some(DoorCommand::SaveTimezone)
        );
        assert_eq!(
            keymap.resolve(PhysicalKey::Digit('7')),
            Some(DoorCommand::InsertDigit('7'))
        );
        assert_eq!(keymap.resolve(PhysicalKey::Hash), None);
    }

    #[test]
    fn custom_binding_overrides_default() {
        let mut keymap = Keymap::new();
        keymap.add_binding(PhysicalKey::Hash, DoorCommand::Clear);
        keymap.add_binding(PhysicalKey::Star, DoorCommand::OpenTimezoneSetup);
        assert_eq!(keymap.resolve(PhysicalKey::Hash), Some(DoorCommand::Clear));
        assert_eq!(
            keymap.resolve(PhysicalKey::Star),
            Some(DoorCommand::OpenTimezoneSetup)
        );
    }

    #[test]
    fn driver_characters_map_to_keys() {
        assert_eq!(PhysicalKey::from_char('0'), Some(PhysicalKey::Digit('0')));
        assert_eq!(PhysicalKey::from_char('b'), Some(PhysicalKey::B));
        assert_eq!(PhysicalKey::from_char('#'), Some(PhysicalKey::Hash));
        assert_eq!(PhysicalKey::from_char('\0'), None);
    }
}
