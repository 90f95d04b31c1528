//! Calendar settings store and the booking lifecycle controller.

pub mod ledger;
pub mod settings;

pub use ledger::NewAppointment;
pub use settings::SettingsUpdate;
