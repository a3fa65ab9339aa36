//! Reply keyboards and the button labels they carry

use crate::domain::entities::ReplyKeyboard;

pub const BTN_ORDERS: &str = "📋 Orders";
pub const BTN_CUSTOMERS: &str = "👥 Customers";
pub const BTN_DRIVERS: &str = "🚚 Drivers";
pub const BTN_HELP: &str = "❓ Help";
pub const BTN_CREATE_ORDER: &str = "➕ Create order";
pub const BTN_ACTIVE_ORDERS: &str = "🟢 Active orders";
pub const BTN_ARCHIVED_ORDERS: &str = "🔴 Archived orders";
pub const BTN_BACK: &str = "⬅️ Back";
pub const BTN_NOTIFICATIONS_ON: &str = "🔔 Enable notifications";
pub const BTN_NOTIFICATIONS_OFF: &str = "🔕 Disable notifications";

pub fn admin_main_menu() -> ReplyKeyboard {
    ReplyKeyboard::new(&[&[BTN_ORDERS, BTN_CUSTOMERS], &[BTN_DRIVERS, BTN_HELP]])
}

pub fn orders_menu() -> ReplyKeyboard {
    ReplyKeyboard::new(&[
        &[BTN_ACTIVE_ORDERS, BTN_ARCHIVED_ORDERS],
        &[BTN_CREATE_ORDER, BTN_BACK],
    ])
}

pub fn customers_menu() -> ReplyKeyboard {
    ReplyKeyboard::new(&[&[BTN_BACK]])
}

pub fn drivers_menu() -> ReplyKeyboard {
    ReplyKeyboard::new(&[&[BTN_BACK]])
}

pub fn driver_main_menu() -> ReplyKeyboard {
    ReplyKeyboard::new(&[
        &[BTN_ORDERS, BTN_HELP],
        &[BTN_NOTIFICATIONS_ON, BTN_NOTIFICATIONS_OFF],
    ])
}
