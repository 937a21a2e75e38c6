//! Per-metric display mode enums.
//!
//! Each mode cycles with wrap-around `next()` (hotkey) and `prev()`
//! (shifted hotkey). `FromStr` accepts the command-line spellings.

use crate::error::Error;

macro_rules! display_mode {
    ($name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn next(self) -> Self {
                let i = Self::ALL.iter().position(|m| *m == self).unwrap();
                Self::ALL[(i + 1) % Self::ALL.len()]
            }

            pub fn prev(self) -> Self {
                let i = Self::ALL.iter().position(|m| *m == self).unwrap();
                Self::ALL[(i + Self::ALL.len() - 1) % Self::ALL.len()]
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(Self::$variant => write!(f, $text)),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok(Self::$variant),)+
                    other => Err(Error::Config(format!(
                        concat!("invalid ", stringify!($name), " value: {}"),
                        other
                    ))),
                }
            }
        }
    };
}

display_mode!(ViewMode {
    Off => "off",
    One => "one",
    All => "all",
});

display_mode!(CpuMode {
    All => "all",
    ByCluster => "by_cluster",
    ByCore => "by_core",
});

display_mode!(GpuMode {
    Collapsed => "collapsed",
    LoadOnly => "load_only",
    LoadAndVram => "load_and_vram",
});

display_mode!(MemoryMode {
    Percent => "percent",
    All => "all",
});

display_mode!(PowerMode {
    Combined => "combined",
    All => "all",
    Off => "off",
});

display_mode!(SimpleMode {
    Show => "show",
    Hide => "hide",
});
