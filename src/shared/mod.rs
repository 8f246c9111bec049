//! Geteilte Typen für modulübergreifende Verträge.
//!
//! Enthält die Laufzeit-Optionen und die versionierten Werte-Zellen,
//! die zwischen `core`, `map` und `render` geteilt werden.

pub mod options;
mod subject;

pub use options::MapOptions;
pub use subject::{Subject, SubjectObserver};
