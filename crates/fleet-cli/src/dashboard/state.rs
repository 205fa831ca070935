/// States of the dashboard loop. Every action returns to `Scanning`;
/// `Exit` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Scanning,
    Display,
    AwaitingCommand,
    /// Zero-based index into the scanned list.
    SyncOne(usize),
    SyncAll,
    Setup,
    Refresh,
    Exit,
}

/// One line of operator input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    SyncAll,
    Setup,
    Refresh,
    Quit,
    /// One-based index as displayed.
    Select(usize),
    Unknown(String),
}

impl Command {
    pub fn parse(input: &str) -> Self {
        let input = input.trim().to_lowercase();
        match input.as_str() {
            "a" => Command::SyncAll,
            "s" => Command::Setup,
            "r" => Command::Refresh,
            "q" => Command::Quit,
            s if !s.is_empty() && s.chars().all(|c| c.is_ascii_digit()) => match s.parse() {
                Ok(n) => Command::Select(n),
                Err(_) => Command::Unknown(s.to_string()),
            },
            other => Command::Unknown(other.to_string()),
        }
    }

    /// State to enter after this command, given how many repositories are
    /// listed. Out-of-range selections and unknown input rescan.
    pub fn transition(&self, repo_count: usize) -> State {
        match self {
            Command::SyncAll => State::SyncAll,
            Command::Setup => State::Setup,
            Command::Refresh => State::Refresh,
            Command::Quit => State::Exit,
            Command::Select(n) if (1..=repo_count).contains(n) => State::SyncOne(n - 1),
            Command::Select(_) | Command::Unknown(_) => State::Scanning,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_letters() {
        assert_eq!(Command::parse("a"), Command::SyncAll);
        assert_eq!(Command::parse("S"), Command::Setup);
        assert_eq!(Command::parse(" r \n"), Command::Refresh);
        assert_eq!(Command::parse("Q"), Command::Quit);
        assert_eq!(Command::parse("x"), Command::Unknown("x".to_string()));
        assert_eq!(Command::parse(""), Command::Unknown(String::new()));
    }

    #[test]
    fn test_parse_numbers() {
        assert_eq!(Command::parse("3"), Command::Select(3));
        assert_eq!(Command::parse("12"), Command::Select(12));
        assert!(matches!(Command::parse("-1"), Command::Unknown(_)));
        assert!(matches!(
            Command::parse("99999999999999999999999"),
            Command::Unknown(_)
        ));
    }

    #[test]
    fn test_transitions() {
        assert_eq!(Command::SyncAll.transition(0), State::SyncAll);
        assert_eq!(Command::Setup.transition(2), State::Setup);
        assert_eq!(Command::Refresh.transition(2), State::Refresh);
        assert_eq!(Command::Quit.transition(2), State::Exit);
    }

    #[test]
    fn test_selection_bounds() {
        assert_eq!(Command::Select(1).transition(2), State::SyncOne(0));
        assert_eq!(Command::Select(2).transition(2), State::SyncOne(1));
        assert_eq!(Command::Select(3).transition(2), State::Scanning);
        assert_eq!(Command::Select(0).transition(2), State::Scanning);
        assert_eq!(Command::Select(1).transition(0), State::Scanning);
    }
}
