/*!
Option layer: prototype grammar and token matching.

  prototype.rs   OptionShape / ValueArity (+ CATCH_ALL)
  set.rs         OptionDefinition, OptionSet::parse -> Matches

Nothing here knows about commands or typed properties; the binding engine
(`crate::bind`) builds definitions from declared properties and applies
`Matches` back onto them.
*/

pub mod prototype;
pub mod set;

pub use prototype::{CATCH_ALL, OptionShape, ValueArity};
pub use set::{Matches, OptionDefinition, OptionSet, RawValue, TERMINATOR};
