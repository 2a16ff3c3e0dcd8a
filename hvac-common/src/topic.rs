use core::{fmt::Display, str::FromStr};

use compact_str::{CompactString, format_compact};

use crate::Command;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// State published by the bridge
    Get,
    /// Commands consumed by the bridge
    Set,
}

impl Direction {
    pub const fn as_str(self) -> &'static str {
        match self {
            Direction::Get => "get",
            Direction::Set => "set",
        }
    }
}

impl Display for Direction {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Property topic relative to a [`TopicPrefix`], eg. `fanspeed/set`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropertyTopic<'a> {
    pub property: &'a str,
    pub direction: Direction,
}

/// Root under which every property gets a `<property>/get` and a
/// `<property>/set` topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicPrefix(CompactString);

impl TopicPrefix {
    pub fn topic(&self, property: &str, direction: Direction) -> CompactString {
        if self.0.is_empty() {
            format_compact!("{property}/{direction}")
        } else {
            format_compact!("{}/{property}/{direction}", self.0)
        }
    }

    /// Topic for `command`, or `None` if the command is not bound to one.
    pub fn command_topic(&self, command: Command, direction: Direction) -> Option<CompactString> {
        command.topic().map(|property| self.topic(property, direction))
    }

    pub fn parse<'a>(&self, topic: &'a str) -> Result<PropertyTopic<'a>, &'static str> {
        let rest = match self.0.is_empty() {
            true => topic,
            false => topic
                .strip_prefix(self.0.as_str())
                .and_then(|rest| rest.strip_prefix('/'))
                .ok_or("outside of prefix")?,
        };

        let mut parts = rest.split('/');

        let property = match parts.next() {
            Some("") | None => return Err("{prefix}"),
            Some(property) => property,
        };

        let direction = match parts.next() {
            Some("get") => Direction::Get,
            Some("set") => Direction::Set,
            Some(_) => return Err("{prefix}/{property}/..."),
            None => return Err("{prefix}/{property}"),
        };

        if parts.next().is_some() {
            return Err("{prefix}/{property}/{direction}/...");
        }

        Ok(PropertyTopic { property, direction })
    }
}

/// Trailing slashes are dropped; an empty prefix puts topics at the root.
impl FromStr for TopicPrefix {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.contains(['+', '#']) {
            return Err("wildcards are not allowed in a topic prefix");
        }

        Ok(Self(s.trim_end_matches('/').into()))
    }
}

impl Display for TopicPrefix {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn topic_display() {
        let prefix = "home/hvac".parse::<TopicPrefix>().unwrap();

        assert_eq!(prefix.topic("temperature", Direction::Get), "home/hvac/temperature/get");
        assert_eq!(
            prefix.command_topic(Command::EnergySave, Direction::Set).unwrap(),
            "home/hvac/powersave/set"
        );
        assert_eq!(prefix.command_topic(Command::SwingHor, Direction::Set), None);

        let prefix = "hvac/".parse::<TopicPrefix>().unwrap();
        assert_eq!(prefix.topic("mode", Direction::Set), "hvac/mode/set");
        let prefix = "".parse::<TopicPrefix>().unwrap();
        assert_eq!(prefix.topic("mode", Direction::Get), "mode/get");
    }

    #[test]
    fn prefix_rejects_wildcards() {
        assert!("home/+".parse::<TopicPrefix>().is_err());
        assert!("home/#".parse::<TopicPrefix>().is_err());
        assert!("+/hvac".parse::<TopicPrefix>().is_err());
        assert_eq!("home/hvac/".parse::<TopicPrefix>().unwrap().to_string(), "home/hvac");
    }

    #[test]
    fn topic_parse() {
        let prefix = "home/hvac".parse::<TopicPrefix>().unwrap();

        assert_eq!(
            prefix.parse("home/hvac/fanspeed/set"),
            Ok(PropertyTopic { property: "fanspeed", direction: Direction::Set })
        );
        assert_eq!(
            prefix.parse("home/hvac/unknown/set"),
            Ok(PropertyTopic { property: "unknown", direction: Direction::Set })
        );
        assert_eq!(
            prefix.parse("home/hvac/mode/get"),
            Ok(PropertyTopic { property: "mode", direction: Direction::Get })
        );

        assert_eq!(prefix.parse("home/other/mode/set"), Err("outside of prefix"));
        assert_eq!(prefix.parse("home/hvacx/mode/set"), Err("outside of prefix"));
        assert_eq!(prefix.parse("home/hvac"), Err("outside of prefix"));
        assert_eq!(prefix.parse("home/hvac/"), Err("{prefix}"));
        assert_eq!(prefix.parse("home/hvac/mode"), Err("{prefix}/{property}"));
        assert_eq!(prefix.parse("home/hvac/mode/toggle"), Err("{prefix}/{property}/..."));
        assert_eq!(
            prefix.parse("home/hvac/mode/set/extra"),
            Err("{prefix}/{property}/{direction}/...")
        );
    }

    #[test]
    fn topic_parse_without_prefix() {
        let prefix = "".parse::<TopicPrefix>().unwrap();

        assert_eq!(
            prefix.parse("power/set"),
            Ok(PropertyTopic { property: "power", direction: Direction::Set })
        );
    }
}
