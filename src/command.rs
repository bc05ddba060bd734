//! # Command
//!
//! The set of FTP commands sent over the control channel

use std::string::ToString;

use crate::types::FileType;

#[derive(Debug, Clone, PartialEq, Eq)]
/// Ftp commands with their arguments
pub enum Command {
    /// Provide login password
    Pass(String),
    /// Passive mode
    Pasv,
    /// Specifies an address and port to which the server should connect (active mode)
    Port(String),
    /// Quit
    Quit,
    /// Set transfer type
    Type(FileType),
    /// Provide user to login as
    User(String),
    /// Any other command, passed through verbatim
    Custom(String),
}

// -- stringify

impl ToString for Command {
    fn to_string(&self) -> String {
        let mut s = match self {
            Self::Pass(p) => format!("PASS {p}"),
            Self::Pasv => "PASV".to_string(),
            Self::Port(p) => format!("PORT {p}"),
            Self::Quit => "QUIT".to_string(),
            Self::Type(t) => format!("TYPE {t}"),
            Self::User(u) => format!("USER {u}"),
            Self::Custom(c) => c.trim().to_string(),
        };
        s.push_str("\r\n");
        s
    }
}

#[cfg(test)]
mod test {

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::types::FormatControl;

    #[test]
    fn should_stringify_command() {
        assert_eq!(
            Command::Pass(String::from("qwerty123"))
                .to_string()
                .as_str(),
            "PASS qwerty123\r\n"
        );
        assert_eq!(Command::Pasv.to_string().as_str(), "PASV\r\n");
        assert_eq!(
            Command::Port(String::from("192,168,1,9,100,50"))
                .to_string()
                .as_str(),
            "PORT 192,168,1,9,100,50\r\n"
        );
        assert_eq!(Command::Quit.to_string().as_str(), "QUIT\r\n");
        assert_eq!(
            Command::Type(FileType::Binary).to_string().as_str(),
            "TYPE I\r\n"
        );
        assert_eq!(
            Command::Type(FileType::Ascii(FormatControl::Default))
                .to_string()
                .as_str(),
            "TYPE A N\r\n"
        );
        assert_eq!(
            Command::User(String::from("omar")).to_string().as_str(),
            "USER omar\r\n"
        );
    }

    #[test]
    fn should_trim_custom_command() {
        assert_eq!(
            Command::Custom(String::from("  NOOP \r\n"))
                .to_string()
                .as_str(),
            "NOOP\r\n"
        );
    }
}
