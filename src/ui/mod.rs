// UI module - GUI logic and the notification bridge
//
// This module contains:
// - bridge: the channel carrying job notifications to the interactive thread
// - form: field parsing and dialog texts, independent of Slint
// - pickers: native file dialogs behind the FilePicker trait
// - GuiController: the Slint window wired to the JobController

pub mod bridge;
pub mod controller;
pub mod form;
pub mod pickers;

pub use bridge::{NotificationReceiver, NotificationSender};
pub use controller::GuiController;
pub use form::{Dialog, DialogKind};
pub use pickers::{FilePicker, NativeFilePicker};
