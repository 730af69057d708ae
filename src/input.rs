use crate::app::InputMode;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Quit,
    NextTab,
    PrevTab,
    JumpTab(u8),
    Down,
    Up,
    PageDown,
    PageUp,
    Top,
    Bottom,
    GPrefix,
    ToggleHelp,
    StartSearch,
    StartCommand,
    NextFilter,
    PrevFilter,
    CycleSort,
    FlipSort,
    ClearQuery,
    Refresh,
    Rescan,
    Dismiss,
    SubmitInput,
    CancelInput,
    Backspace,
    ClearInput,
    InputChar(char),
}

pub fn map_key(mode: InputMode, key: KeyEvent) -> Option<Action> {
    match mode {
        InputMode::Normal => map_normal_mode_key(key),
        InputMode::Search | InputMode::Command => map_input_mode_key(key),
    }
}

fn map_normal_mode_key(key: KeyEvent) -> Option<Action> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => Some(Action::Quit),
            KeyCode::Char('d') => Some(Action::PageDown),
            KeyCode::Char('u') => Some(Action::PageUp),
            KeyCode::Char('l') => Some(Action::Refresh),
            _ => None,
        };
    }

    match key.code {
        KeyCode::Char('q') => Some(Action::Quit),
        KeyCode::Char(c @ '1'..='9') => c.to_digit(10).map(|digit| Action::JumpTab(digit as u8)),
        KeyCode::Right | KeyCode::Tab => Some(Action::NextTab),
        KeyCode::Left | KeyCode::BackTab => Some(Action::PrevTab),
        KeyCode::Char('l') => Some(Action::NextTab),
        KeyCode::Char('h') => Some(Action::PrevTab),
        KeyCode::Char('j') | KeyCode::Down => Some(Action::Down),
        KeyCode::Char('k') | KeyCode::Up => Some(Action::Up),
        KeyCode::PageDown => Some(Action::PageDown),
        KeyCode::PageUp => Some(Action::PageUp),
        KeyCode::Char('g') => Some(Action::GPrefix),
        KeyCode::Home => Some(Action::Top),
        KeyCode::Char('G') | KeyCode::End => Some(Action::Bottom),
        KeyCode::Char('?') => Some(Action::ToggleHelp),
        KeyCode::Char('/') => Some(Action::StartSearch),
        KeyCode::Char(':') => Some(Action::StartCommand),
        KeyCode::Char(';') if key.modifiers.contains(KeyModifiers::SHIFT) => {
            Some(Action::StartCommand)
        }
        KeyCode::Char('f') => Some(Action::NextFilter),
        KeyCode::Char('F') => Some(Action::PrevFilter),
        KeyCode::Char('s') => Some(Action::CycleSort),
        KeyCode::Char('o') => Some(Action::FlipSort),
        KeyCode::Char('c') => Some(Action::ClearQuery),
        KeyCode::Char('r') | KeyCode::F(5) => Some(Action::Refresh),
        KeyCode::Char('R') => Some(Action::Rescan),
        KeyCode::Esc => Some(Action::Dismiss),
        _ => None,
    }
}

fn map_input_mode_key(key: KeyEvent) -> Option<Action> {
    match key.code {
        KeyCode::Esc => Some(Action::CancelInput),
        KeyCode::Enter => Some(Action::SubmitInput),
        KeyCode::Char('m') | KeyCode::Char('j')
            if key.modifiers.contains(KeyModifiers::CONTROL) =>
        {
            Some(Action::SubmitInput)
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(Action::ClearInput)
        }
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(Action::CancelInput)
        }
        KeyCode::Backspace => Some(Action::Backspace),
        KeyCode::Char(c) if key.modifiers.is_empty() || key.modifiers == KeyModifiers::SHIFT => {
            Some(Action::InputChar(c))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::{Action, map_key};
    use crate::app::InputMode;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn normal_mode_maps_quit() {
        assert_eq!(
            map_key(InputMode::Normal, press(KeyCode::Char('q'))),
            Some(Action::Quit)
        );
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(map_key(InputMode::Normal, ctrl_c), Some(Action::Quit));
    }

    #[test]
    fn digits_jump_to_pages() {
        assert_eq!(
            map_key(InputMode::Normal, press(KeyCode::Char('3'))),
            Some(Action::JumpTab(3))
        );
        assert_eq!(map_key(InputMode::Normal, press(KeyCode::Char('0'))), None);
    }

    #[test]
    fn filter_keys_cycle_in_both_directions() {
        assert_eq!(
            map_key(InputMode::Normal, press(KeyCode::Char('f'))),
            Some(Action::NextFilter)
        );
        let shift_f = KeyEvent::new(KeyCode::Char('F'), KeyModifiers::SHIFT);
        assert_eq!(map_key(InputMode::Normal, shift_f), Some(Action::PrevFilter));
    }

    #[test]
    fn refresh_and_rescan_are_distinct() {
        assert_eq!(
            map_key(InputMode::Normal, press(KeyCode::F(5))),
            Some(Action::Refresh)
        );
        let shift_r = KeyEvent::new(KeyCode::Char('R'), KeyModifiers::SHIFT);
        assert_eq!(map_key(InputMode::Normal, shift_r), Some(Action::Rescan));
    }

    #[test]
    fn tab_keys_switch_pages() {
        assert_eq!(
            map_key(InputMode::Normal, press(KeyCode::Tab)),
            Some(Action::NextTab)
        );
        let back_tab = KeyEvent::new(KeyCode::BackTab, KeyModifiers::SHIFT);
        assert_eq!(map_key(InputMode::Normal, back_tab), Some(Action::PrevTab));
    }

    #[test]
    fn normal_mode_maps_shift_semicolon_to_command() {
        let key = KeyEvent::new(KeyCode::Char(';'), KeyModifiers::SHIFT);
        assert_eq!(map_key(InputMode::Normal, key), Some(Action::StartCommand));
    }

    #[test]
    fn input_modes_capture_printable_chars() {
        assert_eq!(
            map_key(InputMode::Search, press(KeyCode::Char('q'))),
            Some(Action::InputChar('q'))
        );
        let upper = KeyEvent::new(KeyCode::Char('N'), KeyModifiers::SHIFT);
        assert_eq!(map_key(InputMode::Command, upper), Some(Action::InputChar('N')));
    }

    #[test]
    fn input_mode_maps_ctrl_m_and_ctrl_j_to_submit() {
        let ctrl_m = KeyEvent::new(KeyCode::Char('m'), KeyModifiers::CONTROL);
        let ctrl_j = KeyEvent::new(KeyCode::Char('j'), KeyModifiers::CONTROL);
        assert_eq!(map_key(InputMode::Command, ctrl_m), Some(Action::SubmitInput));
        assert_eq!(map_key(InputMode::Search, ctrl_j), Some(Action::SubmitInput));
    }

    #[test]
    fn input_mode_ignores_other_control_chords() {
        let key = KeyEvent::new(KeyCode::Char('x'), KeyModifiers::CONTROL);
        assert_eq!(map_key(InputMode::Search, key), None);
    }
}
