//! Message dispatchers - Route chat input to the services
//!
//! Each bot gets its own dispatcher. Menu buttons and slash commands are
//! matched exactly; anything starting with a command key goes through the
//! parser. Every failure becomes a chat reply, so handlers never return errors.

use std::collections::HashSet;
use std::sync::Arc;

use super::formatter;
use super::keyboards::{self, *};
use super::parser::{self, AdminCommand, CommandKey};
use crate::application::errors::ServiceError;
use crate::application::services::{CustomerService, DriverService, OrderService};
use crate::domain::entities::{short_uuid, CityChange, Driver, Message, OrderStatus, Reply};

/// Turns one inbound message into one reply.
pub trait MessageHandler: Send + Sync {
    fn handle(&self, message: &Message) -> Reply;
}

const ADMIN_HELP: &str = "Available commands:
/start - Main menu
/help - Show this help
/status - System status
/orders - All orders
/active_orders - Active orders
/archived_orders - Archived orders
/customers - Customers
/drivers - Drivers

Add a customer:
ADD_USER
Name
Phone
Telegram ID (or -)
Telegram tag (or -)

Create an order:
ADD_ORDER
Title
Description
Weight (kg)
From city
From address
To city
To address
Price
Customer UUID

Change order status:
ARCHIVE_ORDER <UUID>
ACTIVATE_ORDER <UUID>

Set a driver's city and notifications:
SET_CITY_AND_NOTIFICATION
<UUID>, city, on/off
An empty city keeps the current one, '-' clears it.";

const CREATE_ORDER_TEMPLATE: &str = "📝 New order

Send a message in this format:

ADD_ORDER
Title
Description
Weight (kg)
From city
From address
To city
To address
Price
Customer UUID

Example:
ADD_ORDER
Furniture delivery
Sofa and a table
25.5
Москва
Тверская, 1
Санкт-Петербург
Невский проспект, 10
15000
12345678-1234-1234-1234-123456789abc

The extended format adds length, width and height after the weight, tags after the to-address and an available-from date (YYYY-MM-DD) after the price. Use '-' for anything unknown.";

const DRIVER_HELP: &str = "Available commands:
/start - Main menu
/help - Show this help
/orders - Available orders
🔔 Enable notifications - Receive new orders
🔕 Disable notifications - Stop receiving new orders";

const UNKNOWN_COMMAND: &str = "Unknown command. Use the menu buttons or /help.";

fn usage(key: CommandKey) -> &'static str {
    match key {
        CommandKey::AddUser => "ADD_USER\nIvan Ivanov\n+79001234567\n123456789\n@ivan",
        CommandKey::AddOrder => "See ➕ Create order for the ADD_ORDER format.",
        CommandKey::SetCityAndNotification => {
            "SET_CITY_AND_NOTIFICATION\n12345678-1234-1234-1234-123456789abc, Москва, on"
        }
        CommandKey::ArchiveOrder => "ARCHIVE_ORDER 12345678-1234-1234-1234-123456789abc",
        CommandKey::ActivateOrder => "ACTIVATE_ORDER 12345678-1234-1234-1234-123456789abc",
    }
}

/// Reply text for a failed service call. Storage details are logged only.
fn failure(action: &str, err: &ServiceError) -> String {
    if err.is_storage() {
        tracing::error!(error = %err, "{} failed", action);
    } else {
        tracing::debug!(error = %err, "{} rejected", action);
    }
    format!("❌ {} failed: {}", action, err.user_message())
}

/// Admin bot routing
pub struct AdminDispatcher {
    orders: Arc<OrderService>,
    customers: Arc<CustomerService>,
    drivers: Arc<DriverService>,
    allowed_users: HashSet<i64>,
}

impl AdminDispatcher {
    pub fn new(orders: Arc<OrderService>, customers: Arc<CustomerService>, drivers: Arc<DriverService>) -> Self {
        Self {
            orders,
            customers,
            drivers,
            allowed_users: HashSet::new(),
        }
    }

    /// Restrict the bot to these telegram ids. An empty list allows everyone.
    pub fn with_allowed_users(mut self, users: impl IntoIterator<Item = i64>) -> Self {
        self.allowed_users = users.into_iter().collect();
        self
    }

    fn is_allowed(&self, user_id: i64) -> bool {
        self.allowed_users.is_empty() || self.allowed_users.contains(&user_id)
    }

    fn status(&self) -> String {
        let counts = self.orders.order_stats().and_then(|stats| {
            Ok((stats, self.customers.count_customers()?, self.drivers.count_drivers()?))
        });
        match counts {
            Ok((stats, customers, drivers)) => formatter::format_status_summary(&stats, customers, drivers),
            Err(e) => {
                tracing::error!(error = %e, "Failed to collect statistics");
                "⚠️ System is running, but the database is unavailable".to_string()
            }
        }
    }

    fn list_orders(&self, status: Option<OrderStatus>) -> String {
        let orders = match status {
            Some(status) => self.orders.get_orders_by_status(status),
            None => self.orders.get_all_orders(),
        };
        match orders {
            Ok(orders) => formatter::format_orders_admin(&orders),
            Err(e) => failure("Loading orders", &e),
        }
    }

    fn run_command(&self, key: CommandKey, text: &str) -> String {
        let command = match parser::parse_command(text) {
            Ok(command) => command,
            Err(e) => {
                tracing::debug!(key = key.as_str(), error = %e, "Malformed command");
                return format!("❌ Invalid {}: {}\n\nExample:\n{}", key.as_str(), e, usage(key));
            }
        };

        match command {
            AdminCommand::AddCustomer(new_customer) => match self.customers.create_customer(new_customer) {
                Ok(customer) => formatter::format_customer_created(&customer),
                Err(e) => failure("Creating customer", &e),
            },
            AdminCommand::AddOrder(request) => match self.orders.create_order_from_request(request) {
                Ok(order) => formatter::format_order_created(&order),
                Err(e) => failure("Creating order", &e),
            },
            AdminCommand::SetCityAndNotification(request) => {
                let result = self.drivers.update_driver_city_and_notifications(
                    request.driver_uuid,
                    request.city.clone(),
                    request.notification_enabled,
                );
                match result {
                    Ok(()) => formatter::format_driver_updated(&request),
                    Err(e) => failure("Updating driver", &e),
                }
            }
            AdminCommand::SetOrderStatus { order_uuid, status } => {
                match self.orders.update_order_status(order_uuid, status) {
                    Ok(()) => {
                        let verb = match status {
                            OrderStatus::Active => "activated",
                            OrderStatus::Archived => "archived",
                        };
                        format!("✅ Order {} {}", short_uuid(&order_uuid), verb)
                    }
                    Err(e) => failure("Updating order status", &e),
                }
            }
        }
    }
}

impl MessageHandler for AdminDispatcher {
    fn handle(&self, message: &Message) -> Reply {
        if !self.is_allowed(message.sender.id) {
            tracing::warn!(user = message.sender.id, "Admin access denied");
            return Reply::text("⛔ Access denied");
        }

        let text = message.trimmed();
        tracing::debug!(chat = message.chat_id, text, "Admin message");

        match text {
            "/start" => Reply::text("Welcome to the admin panel! Choose an action.")
                .with_keyboard(keyboards::admin_main_menu()),
            "/help" | BTN_HELP => Reply::text(ADMIN_HELP),
            "/status" => Reply::text(self.status()),
            "/orders" | BTN_ORDERS => Reply::text(self.list_orders(None)).with_keyboard(keyboards::orders_menu()),
            "/create_order" | BTN_CREATE_ORDER => {
                Reply::text(CREATE_ORDER_TEMPLATE).with_keyboard(keyboards::orders_menu())
            }
            "/active_orders" | BTN_ACTIVE_ORDERS => {
                Reply::text(self.list_orders(Some(OrderStatus::Active))).with_keyboard(keyboards::orders_menu())
            }
            "/archived_orders" | BTN_ARCHIVED_ORDERS => {
                Reply::text(self.list_orders(Some(OrderStatus::Archived))).with_keyboard(keyboards::orders_menu())
            }
            "/users" | "/customers" | BTN_CUSTOMERS => {
                let text = match self.customers.get_all_customers() {
                    Ok(customers) => formatter::format_customers(&customers),
                    Err(e) => failure("Loading customers", &e),
                };
                Reply::text(text).with_keyboard(keyboards::customers_menu())
            }
            "/drivers" | BTN_DRIVERS => {
                let text = match self.drivers.get_all_drivers() {
                    Ok(drivers) => formatter::format_drivers(&drivers),
                    Err(e) => failure("Loading drivers", &e),
                };
                Reply::text(text).with_keyboard(keyboards::drivers_menu())
            }
            BTN_BACK => Reply::text("Main menu").with_keyboard(keyboards::admin_main_menu()),
            _ => match CommandKey::classify(text) {
                Some(key) => Reply::text(self.run_command(key, text)),
                None => Reply::text(UNKNOWN_COMMAND),
            },
        }
    }
}

/// Driver bot routing. Every sender is registered as a driver on first contact.
pub struct DriverDispatcher {
    orders: Arc<OrderService>,
    drivers: Arc<DriverService>,
}

impl DriverDispatcher {
    pub fn new(orders: Arc<OrderService>, drivers: Arc<DriverService>) -> Self {
        Self { orders, drivers }
    }

    fn set_notifications(&self, driver: Option<&Driver>, enabled: bool) -> String {
        let Some(driver) = driver else {
            return "❌ Could not update notifications, please try again later.".to_string();
        };
        match self
            .drivers
            .update_driver_city_and_notifications(driver.uuid, CityChange::Keep, Some(enabled))
        {
            Ok(()) if enabled => "✅ Notifications enabled. You will receive new orders.".to_string(),
            Ok(()) => "🔕 Notifications disabled. You will not receive new orders.".to_string(),
            Err(e) => failure("Updating notifications", &e),
        }
    }
}

impl MessageHandler for DriverDispatcher {
    fn handle(&self, message: &Message) -> Reply {
        let sender = &message.sender;
        let driver = match self
            .drivers
            .ensure_driver_exists_by_telegram(&sender.display_name(), sender.id, sender.tag())
        {
            Ok(driver) => Some(driver),
            Err(e) => {
                tracing::error!(user = sender.id, error = %e, "Driver auto-registration failed");
                None
            }
        };

        let text = message.trimmed();
        tracing::debug!(chat = message.chat_id, text, "Driver message");

        match text {
            "/start" => Reply::text("Welcome! You are registered as a driver. Choose an action.")
                .with_keyboard(keyboards::driver_main_menu()),
            "/help" | BTN_HELP => Reply::text(DRIVER_HELP),
            "/orders" | BTN_ORDERS => {
                let text = match self.orders.get_active_orders() {
                    Ok(orders) => formatter::format_orders_driver(&orders),
                    Err(e) => failure("Loading orders", &e),
                };
                Reply::text(text).with_keyboard(keyboards::driver_main_menu())
            }
            BTN_NOTIFICATIONS_ON => {
                Reply::text(self.set_notifications(driver.as_ref(), true)).with_keyboard(keyboards::driver_main_menu())
            }
            BTN_NOTIFICATIONS_OFF => Reply::text(self.set_notifications(driver.as_ref(), false))
                .with_keyboard(keyboards::driver_main_menu()),
            BTN_BACK => Reply::text("Main menu").with_keyboard(keyboards::driver_main_menu()),
            _ => Reply::text(UNKNOWN_COMMAND),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::User;
    use crate::domain::traits::DriverRepository;
    use crate::infrastructure::storage::InMemoryStore;

    struct Fixture {
        store: Arc<InMemoryStore>,
        admin: AdminDispatcher,
        driver: DriverDispatcher,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(InMemoryStore::with_cities(&["Москва", "Казань"]));
        let orders = Arc::new(OrderService::new(store.clone(), store.clone(), store.clone()));
        let customers = Arc::new(CustomerService::new(store.clone()));
        let drivers = Arc::new(DriverService::new(store.clone(), store.clone()));
        Fixture {
            admin: AdminDispatcher::new(orders.clone(), customers, drivers.clone()),
            driver: DriverDispatcher::new(orders, drivers),
            store,
        }
    }

    fn msg(user_id: i64, text: &str) -> Message {
        Message::new(user_id, User::new(user_id).with_name("Petr", Some("Petrov")), text)
    }

    fn uuid_after(text: &str, marker: &str) -> String {
        let start = text.find(marker).expect("marker present") + marker.len();
        text[start..].lines().next().unwrap().trim().to_string()
    }

    #[test]
    fn test_start_shows_main_menu() {
        let f = fixture();
        let reply = f.admin.handle(&msg(1, "/start"));
        assert_eq!(reply.keyboard, Some(keyboards::admin_main_menu()));
    }

    #[test]
    fn test_customer_then_order_flow() {
        let f = fixture();

        let reply = f.admin.handle(&msg(1, "ADD_USER\nIvan\n+79990001111\n-\n-"));
        assert!(reply.text.starts_with("✅ Customer created!"), "{}", reply.text);
        let customer_uuid = uuid_after(&reply.text, "🆔 UUID: ");

        let order_text = format!(
            "ADD_ORDER\nSofa\nTwo seats\n25,5\nМосква\nТверская, 1\nКазань\nБаумана, 2\n15000\n{}",
            customer_uuid
        );
        let reply = f.admin.handle(&msg(1, &order_text));
        assert!(reply.text.starts_with("✅ Order created!"), "{}", reply.text);
        let order_uuid = uuid_after(&reply.text, "🆔 ID: ");

        let reply = f.admin.handle(&msg(1, &format!("ARCHIVE_ORDER {}", order_uuid)));
        assert!(reply.text.contains("archived"));
        let listing = f.admin.handle(&msg(1, BTN_ACTIVE_ORDERS));
        assert_eq!(listing.text, "📋 No orders yet");

        f.admin.handle(&msg(1, &format!("ACTIVATE_ORDER {}", order_uuid)));
        let listing = f.admin.handle(&msg(1, "/orders"));
        assert!(listing.text.contains("Москва → Казань"));
        assert!(listing.text.contains("👤 Ivan (+79990001111)"));

        let status = f.admin.handle(&msg(1, "/status"));
        assert!(status.text.contains("Orders total: 1"));
        assert!(status.text.contains("Customers: 1"));
    }

    #[test]
    fn test_errors_become_replies() {
        let f = fixture();

        let reply = f.admin.handle(&msg(1, "ADD_USER\nIvan"));
        assert!(reply.text.contains("not enough data"));
        assert!(reply.text.contains("Example:"));

        let reply = f.admin.handle(&msg(1, "ADD_USER\nIvan\n+7900\n-\n-"));
        assert!(reply.text.starts_with("✅"));
        let reply = f.admin.handle(&msg(1, "ADD_USER\nPetr\n+7900\n-\n-"));
        assert!(reply.text.contains("already exists"), "{}", reply.text);

        let reply = f.admin.handle(&msg(1, "hello"));
        assert_eq!(reply.text, UNKNOWN_COMMAND);
    }

    #[test]
    fn test_allowed_users_gate() {
        let f = fixture();
        let admin = f.admin.with_allowed_users([7]);
        assert_eq!(admin.handle(&msg(8, "/status")).text, "⛔ Access denied");
        assert!(admin.handle(&msg(7, "/status")).text.starts_with("✅"));
    }

    #[test]
    fn test_driver_registers_and_toggles_notifications() {
        let f = fixture();

        let reply = f.driver.handle(&msg(55, "/start"));
        assert_eq!(reply.keyboard, Some(keyboards::driver_main_menu()));
        let driver = f.store.get_driver_by_telegram_id(55).unwrap().unwrap();
        assert_eq!(driver.name, "Petr Petrov");
        assert!(driver.notification_enabled);

        f.driver.handle(&msg(55, BTN_NOTIFICATIONS_OFF));
        assert!(!f.store.get_driver_by_telegram_id(55).unwrap().unwrap().notification_enabled);

        let reply = f.driver.handle(&msg(55, BTN_NOTIFICATIONS_ON));
        assert!(reply.text.contains("enabled"));
        assert_eq!(f.store.count_drivers().unwrap(), 1);
    }

    #[test]
    fn test_admin_sets_driver_city() {
        let f = fixture();
        f.driver.handle(&msg(55, "/start"));
        let driver = f.store.get_driver_by_telegram_id(55).unwrap().unwrap();

        let reply = f.admin.handle(&msg(
            1,
            &format!("SET_CITY_AND_NOTIFICATION\n{}, Казань, выкл", driver.uuid),
        ));
        assert!(reply.text.contains("city set: Казань"), "{}", reply.text);

        let updated = f.store.get_driver_by_telegram_id(55).unwrap().unwrap();
        assert_eq!(updated.city.unwrap().name, "Казань");
        assert!(!updated.notification_enabled);

        let reply = f.admin.handle(&msg(
            1,
            &format!("SET_CITY_AND_NOTIFICATION\n{}, Атлантида, вкл", driver.uuid),
        ));
        assert!(reply.text.contains("city not found: 'Атлантида'"));
    }
}
