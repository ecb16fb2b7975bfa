// SPDX-License-Identifier: MIT

/// Defines the set of known GPT partition type GUIDs.
///
/// Generates, per type:
/// - `pub const GPT_PARTITION_TYPE_<NAME>: [u8; 16]` (on-disk
///   mixed-endian layout),
/// - `pub fn is_<name>_partition(&GptEntry) -> bool`,
///
/// plus the `GptPartitionKind` enum with `from_guid`, `as_guid` and a
/// `Display` that renders unknown GUIDs in canonical text form.
///
/// Requires the `paste` crate for identifier concatenation.
#[macro_export]
macro_rules! define_partition_types {
    (
        $(
            $name:ident => $desc:expr, $guid:expr
        ),+ $(,)?
    ) => {
        paste::paste! {
            $(
                #[doc = $desc]
                pub const [<GPT_PARTITION_TYPE_ $name:upper>]: [u8; 16] = $guid;

                #[doc = concat!("Checks if a GPT partition is of type: ", $desc)]
                pub fn [<is_ $name:lower _partition>](
                    entry: &$crate::gpt::GptEntry,
                ) -> bool {
                    entry.type_guid == [<GPT_PARTITION_TYPE_ $name:upper>]
                }
            )+

            #[derive(Debug, Clone, PartialEq, Eq)]
            pub enum GptPartitionKind {
                $($name,)+
                Unknown([u8; 16]),
            }

            impl GptPartitionKind {
                pub fn from_guid(guid: &[u8; 16]) -> Self {
                    match guid {
                        $(g if g == &[<GPT_PARTITION_TYPE_ $name:upper>] => Self::$name,)+
                        other => Self::Unknown(*other),
                    }
                }

                pub fn as_guid(&self) -> Option<&'static [u8; 16]> {
                    match self {
                        $(Self::$name => Some(&[<GPT_PARTITION_TYPE_ $name:upper>]),)+
                        Self::Unknown(_) => None,
                    }
                }
            }

            impl core::fmt::Display for GptPartitionKind {
                fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                    match self {
                        $(Self::$name => write!(f, $desc),)+
                        Self::Unknown(guid) => write!(f, "{}", $crate::guids::format_guid(guid)),
                    }
                }
            }
        }
    };
}
