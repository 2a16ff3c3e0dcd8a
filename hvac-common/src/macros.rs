/// Declares the closed set of device commands.
///
/// Each command carries the identifier used in the command tables, the key of
/// its value in the device's raw property map, and the topic name it is bound
/// to on the bus (`None` for commands that are registered but not published).
macro_rules! commands {
    (
        $(
            $( #[ $meta:meta ] )*
            $variant:ident => { name: $name:literal, code: $code:literal, topic: $topic:expr $(,)? }
        ),* $(,)?
    ) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub enum Command {
            $( $( #[ $meta ] )* $variant, )*
        }

        impl Command {
            /// Every registered command, in publish order.
            pub const ALL: &[Command] = &[ $( Command::$variant, )* ];

            pub const fn name(self) -> &'static str {
                match self {
                    $( Command::$variant => $name, )*
                }
            }

            pub const fn code(self) -> &'static str {
                match self {
                    $( Command::$variant => $code, )*
                }
            }

            pub const fn topic(self) -> Option<&'static str> {
                match self {
                    $( Command::$variant => $topic, )*
                }
            }
        }
    };
}
