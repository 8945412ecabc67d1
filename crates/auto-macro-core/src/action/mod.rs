mod key_symbol;
mod log;
mod record;
mod slot;

pub use {
    key_symbol::{KeySymbol, NamedKey, RawKey},
    log::ActionLog,
    record::{ActionRecord, MouseButton},
    slot::LogSlot,
};
