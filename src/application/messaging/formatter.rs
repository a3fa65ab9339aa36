//! Response formatter - Renders entities into chat text
//!
//! Field order inside every block is fixed so that replies are stable and
//! easy to scan. Long replies go through [`split_message`] before sending.

use std::fmt::Write;

use chrono::{DateTime, NaiveDate, Utc};

use crate::domain::entities::{
    short_uuid, CityChange, Customer, Dimensions, Driver, DriverSettingsRequest, Order, OrderStats,
    OrderStatus, RoutePoint,
};

/// Hard message length limit of the Telegram Bot API.
pub const TELEGRAM_MAX_MESSAGE_LEN: usize = 4096;
/// Default split size, leaving a margin under the hard limit.
pub const DEFAULT_MAX_MESSAGE_LEN: usize = 4000;

pub const NOT_SPECIFIED: &str = "Not specified";
pub const NO_TAGS: &str = "No tags";
pub const NO_ADDRESSES: &str = "Addresses not specified";

const DATE_FORMAT: &str = "%d.%m.%Y";
const TIMESTAMP_FORMAT: &str = "%d.%m.%Y %H:%M";

/// Route line plus address line for an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationSummary {
    pub route: String,
    pub addresses: String,
}

/// Summarise both route endpoints.
///
/// Two known cities give `A → B`, one gives single-endpoint phrasing and none
/// gives [`NOT_SPECIFIED`]. Addresses are labelled with their city when known.
pub fn format_location(from: &RoutePoint, to: &RoutePoint) -> LocationSummary {
    let route = match (from.city_name.as_deref(), to.city_name.as_deref()) {
        (Some(a), Some(b)) => format!("{} → {}", a, b),
        (Some(a), None) => format!("From {}", a),
        (None, Some(b)) => format!("To {}", b),
        (None, None) => NOT_SPECIFIED.to_string(),
    };

    let mut labelled = Vec::new();
    if let Some(address) = from.address.as_deref() {
        labelled.push(format!("{}: {}", from.city_name.as_deref().unwrap_or("from"), address));
    }
    if let Some(address) = to.address.as_deref() {
        labelled.push(format!("{}: {}", to.city_name.as_deref().unwrap_or("to"), address));
    }
    let addresses = if labelled.is_empty() {
        NO_ADDRESSES.to_string()
    } else {
        labelled.join(" | ")
    };

    LocationSummary { route, addresses }
}

pub fn format_tags(tags: &[String]) -> String {
    if tags.is_empty() {
        NO_TAGS.to_string()
    } else {
        tags.join(", ")
    }
}

pub fn format_dimensions(dimensions: Option<&Dimensions>) -> String {
    match dimensions {
        Some(d) => format!("{:.0}×{:.0}×{:.0} cm", d.length_cm, d.width_cm, d.height_cm),
        None => NOT_SPECIFIED.to_string(),
    }
}

pub fn format_date(date: &NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.format(TIMESTAMP_FORMAT).to_string()
}

fn status_label(status: OrderStatus) -> &'static str {
    match status {
        OrderStatus::Active => "🟢 Active",
        OrderStatus::Archived => "🔴 Archived",
    }
}

/// Full order listing for the admin bot, including IDs and customer contact.
pub fn format_orders_admin(orders: &[Order]) -> String {
    if orders.is_empty() {
        return "📋 No orders yet".to_string();
    }

    let mut out = String::new();
    let _ = writeln!(out, "📋 Orders ({}):\n", orders.len());

    for (i, order) in orders.iter().enumerate() {
        let location = format_location(&order.from, &order.to);

        let _ = writeln!(out, "{}. 🚚 Order #{}", i + 1, order.short_id());
        let _ = writeln!(out, "   {}", status_label(order.status));
        let _ = writeln!(out, "   📝 {}", order.title);
        if !order.description.is_empty() {
            let _ = writeln!(out, "   📄 {}", order.description);
        }
        match &order.customer {
            Some(customer) => {
                let _ = writeln!(out, "   👤 {} ({})", customer.name, customer.phone);
                if let Some(id) = customer.telegram_id {
                    let _ = writeln!(out, "   🆔 Telegram ID: {}", id);
                }
                if let Some(tag) = customer.telegram_tag.as_deref().filter(|t| !t.is_empty()) {
                    let _ = writeln!(out, "   🏷️ Telegram: {}", tag);
                }
            }
            None => {
                let _ = writeln!(out, "   👤 Customer {}", short_uuid(&order.customer_uuid));
            }
        }
        let _ = writeln!(out, "   {}", location.route);
        let _ = writeln!(out, "   🏠 {}", location.addresses);
        let _ = writeln!(out, "   ⚖️ {:.1} kg", order.weight_kg);
        let _ = writeln!(out, "   📏 {}", format_dimensions(order.dimensions.as_ref()));
        let _ = writeln!(out, "   🏷️ {}", format_tags(&order.tags));
        let _ = writeln!(out, "   💰 {:.0} ₽", order.price);
        if let Some(date) = &order.available_from {
            let _ = writeln!(out, "   📅 {}", format_date(date));
        }
        let _ = writeln!(out, "   🆔 ID: {}", order.uuid);
        out.push('\n');
    }

    out
}

/// Compact listing for drivers: no internal IDs, no status.
pub fn format_orders_driver(orders: &[Order]) -> String {
    if orders.is_empty() {
        return "📋 No orders yet".to_string();
    }

    let mut out = String::new();
    let _ = writeln!(out, "📋 Available orders ({}):\n", orders.len());

    for (i, order) in orders.iter().enumerate() {
        let location = format_location(&order.from, &order.to);

        let _ = writeln!(out, "{}. 🚚 Order", i + 1);
        let _ = writeln!(out, "   📝 {}", order.title);
        if !order.description.is_empty() {
            let _ = writeln!(out, "   📄 {}", order.description);
        }
        let _ = writeln!(out, "   {}", location.route);
        let _ = writeln!(out, "   🏠 {}", location.addresses);
        let _ = writeln!(out, "   ⚖️ {:.1} kg | 💰 {:.0} ₽", order.weight_kg, order.price);
        if let Some(customer) = &order.customer {
            let _ = writeln!(out, "   👤 {} | 📱 {}", customer.name, customer.phone);
        }
        if !order.tags.is_empty() {
            let _ = writeln!(out, "   🏷️ {}", format_tags(&order.tags));
        }
        if let Some(date) = &order.available_from {
            let _ = writeln!(out, "   📅 Available from {}", format_date(date));
        }
        out.push('\n');
    }

    out
}

pub fn format_customers(customers: &[Customer]) -> String {
    if customers.is_empty() {
        return "👥 No customers yet".to_string();
    }

    let mut out = String::new();
    let _ = writeln!(out, "👥 Customers ({}):\n", customers.len());

    for (i, customer) in customers.iter().enumerate() {
        let _ = writeln!(out, "{}. 👤 {}", i + 1, customer.name);
        let _ = writeln!(out, "   📱 {}", customer.phone);
        let _ = writeln!(out, "   🆔 Telegram ID: {}", telegram_id_or_dash(customer.telegram_id));
        let _ = writeln!(out, "   🏷️ Telegram Tag: {}", customer.telegram_tag.as_deref().unwrap_or("-"));
        let _ = writeln!(out, "   📅 Created: {}", format_timestamp(&customer.created_at));
        let _ = writeln!(out, "   🆔 UUID: {}", customer.uuid);
        out.push('\n');
    }

    out
}

pub fn format_drivers(drivers: &[Driver]) -> String {
    if drivers.is_empty() {
        return "🚚 No drivers yet".to_string();
    }

    let mut out = String::new();
    let _ = writeln!(out, "🚚 Drivers ({}):\n", drivers.len());

    for (i, driver) in drivers.iter().enumerate() {
        let city = driver.city.as_ref().map(|c| c.name.as_str()).unwrap_or(NOT_SPECIFIED);
        let notifications = if driver.notification_enabled {
            "🔔 Notifications on"
        } else {
            "🔕 Notifications off"
        };

        let _ = writeln!(out, "{}. 🚚 {}", i + 1, driver.name);
        let _ = writeln!(out, "   📱 Telegram ID: {}", driver.telegram_id);
        let _ = writeln!(out, "   🏷️ Telegram Tag: {}", driver.telegram_tag.as_deref().unwrap_or("-"));
        let _ = writeln!(out, "   🏙️ City: {}", city);
        let _ = writeln!(out, "   {}", notifications);
        let _ = writeln!(out, "   📅 Registered: {}", format_timestamp(&driver.created_at));
        let _ = writeln!(out, "   🆔 UUID: {}", driver.uuid);
        out.push('\n');
    }

    out
}

pub fn format_customer_created(customer: &Customer) -> String {
    format!(
        "✅ Customer created!\n\n👤 Name: {}\n📱 Phone: {}\n🆔 Telegram ID: {}\n🏷️ Telegram Tag: {}\n🆔 UUID: {}",
        customer.name,
        customer.phone,
        telegram_id_or_dash(customer.telegram_id),
        customer.telegram_tag.as_deref().unwrap_or("-"),
        customer.uuid
    )
}

pub fn format_order_created(order: &Order) -> String {
    let location = format_location(&order.from, &order.to);
    format!(
        "✅ Order created!\n\n📝 {}\n📄 {}\n⚖️ {:.1} kg\n🏙️ {}\n💰 {:.0} ₽\n🆔 ID: {}",
        order.title, order.description, order.weight_kg, location.route, order.price, order.uuid
    )
}

pub fn format_driver_updated(request: &DriverSettingsRequest) -> String {
    let city = match &request.city {
        CityChange::Keep => "city unchanged".to_string(),
        CityChange::Clear => "city cleared".to_string(),
        CityChange::Set(name) => format!("city set: {}", name),
    };
    let notifications = match request.notification_enabled {
        Some(true) => "notifications on",
        Some(false) => "notifications off",
        None => "notifications unchanged",
    };
    format!(
        "✅ Driver updated!\n\n🚚 UUID: {}\n🏙️ {}\n🔔 {}",
        short_uuid(&request.driver_uuid),
        city,
        notifications
    )
}

pub fn format_status_summary(stats: &OrderStats, customers: usize, drivers: usize) -> String {
    format!(
        "✅ System is running.\n📊 Statistics:\n📋 Orders total: {}\n🟢 Active: {}\n🔴 Archived: {}\n👥 Customers: {}\n🚚 Drivers: {}",
        stats.total, stats.active, stats.archived, customers, drivers
    )
}

fn telegram_id_or_dash(id: Option<i64>) -> String {
    id.map(|id| id.to_string()).unwrap_or_else(|| "-".to_string())
}

/// Split `text` into parts of at most `max_len` characters.
///
/// Lines are kept whole where possible; a single line longer than the limit
/// is broken on whitespace. Each part is trimmed and blank parts are dropped.
/// A part is longer than `max_len` only if it is one word that already was.
pub fn split_message(text: &str, max_len: usize) -> Vec<String> {
    let max_len = max_len.max(1);
    if text.chars().count() <= max_len {
        let trimmed = text.trim();
        return if trimmed.is_empty() {
            Vec::new()
        } else {
            vec![trimmed.to_string()]
        };
    }

    let mut parts = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for line in text.split('\n') {
        let line_len = line.chars().count();
        let joined_len = if current_len == 0 {
            line_len
        } else {
            current_len + 1 + line_len
        };

        if joined_len <= max_len {
            if current_len > 0 {
                current.push('\n');
            }
            current.push_str(line);
            current_len = joined_len;
            continue;
        }

        flush_part(&mut parts, &mut current);
        current_len = 0;

        if line_len <= max_len {
            current.push_str(line);
            current_len = line_len;
            continue;
        }

        for word in line.split_whitespace() {
            let word_len = word.chars().count();
            if current_len > 0 && current_len + 1 + word_len > max_len {
                flush_part(&mut parts, &mut current);
                current_len = 0;
            }
            if current_len > 0 {
                current.push(' ');
                current_len += 1;
            }
            current.push_str(word);
            current_len += word_len;
        }
    }

    flush_part(&mut parts, &mut current);
    parts
}

fn flush_part(parts: &mut Vec<String>, current: &mut String) {
    let trimmed = current.trim();
    if !trimmed.is_empty() {
        parts.push(trimmed.to_string());
    }
    current.clear();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{CityRef, CustomerContact};
    use chrono::TimeZone;
    use uuid::Uuid;

    fn point(city: Option<&str>, address: Option<&str>) -> RoutePoint {
        RoutePoint {
            city_uuid: city.map(|_| Uuid::new_v4()),
            city_name: city.map(str::to_string),
            address: address.map(str::to_string),
        }
    }

    fn sample_order() -> Order {
        Order {
            uuid: Uuid::parse_str("abcdef12-1234-1234-1234-123456789abc").unwrap(),
            customer_uuid: Uuid::new_v4(),
            title: "Sofa".into(),
            description: "Two seats".into(),
            weight_kg: 25.5,
            dimensions: None,
            from: point(Some("Москва"), Some("Тверская, 1")),
            to: point(Some("Казань"), None),
            tags: vec![],
            price: 15000.0,
            available_from: NaiveDate::from_ymd_opt(2025, 8, 10),
            status: OrderStatus::Archived,
            created_at: Utc.with_ymd_and_hms(2025, 8, 1, 12, 30, 0).unwrap(),
            customer: Some(CustomerContact {
                name: "Ivan".into(),
                phone: "+7900".into(),
                telegram_id: Some(42),
                telegram_tag: None,
            }),
        }
    }

    #[test]
    fn test_location_both_cities() {
        let summary = format_location(&point(Some("A"), Some("x")), &point(Some("B"), Some("y")));
        assert_eq!(summary.route, "A → B");
        assert_eq!(summary.addresses, "A: x | B: y");

        let summary = format_location(&point(Some("A"), None), &point(Some("B"), None));
        assert_eq!(summary.addresses, NO_ADDRESSES);
    }

    #[test]
    fn test_location_single_endpoint() {
        let summary = format_location(&point(Some("A"), Some("x")), &point(None, None));
        assert_eq!(summary.route, "From A");
        assert_eq!(summary.addresses, "A: x");

        let summary = format_location(&point(None, None), &point(Some("B"), Some("y")));
        assert_eq!(summary.route, "To B");
        assert_eq!(summary.addresses, "B: y");
    }

    #[test]
    fn test_location_nothing_known() {
        let summary = format_location(&RoutePoint::default(), &RoutePoint::default());
        assert_eq!(summary.route, NOT_SPECIFIED);
        assert_eq!(summary.addresses, NO_ADDRESSES);

        let summary = format_location(&point(None, Some("depot")), &RoutePoint::default());
        assert_eq!(summary.route, NOT_SPECIFIED);
        assert_eq!(summary.addresses, "from: depot");
    }

    #[test]
    fn test_tags_and_dimensions() {
        assert_eq!(format_tags(&[]), NO_TAGS);
        assert_eq!(format_tags(&["a".into(), "b".into()]), "a, b");
        let dims = Dimensions {
            length_cm: 120.0,
            width_cm: 80.0,
            height_cm: 100.4,
        };
        assert_eq!(format_dimensions(Some(&dims)), "120×80×100 cm");
        assert_eq!(format_dimensions(None), NOT_SPECIFIED);
    }

    #[test]
    fn test_admin_order_block() {
        let text = format_orders_admin(&[sample_order()]);
        let expected_order = [
            "📋 Orders (1):",
            "1. 🚚 Order #abcdef12",
            "🔴 Archived",
            "📝 Sofa",
            "👤 Ivan (+7900)",
            "🆔 Telegram ID: 42",
            "Москва → Казань",
            "🏠 Москва: Тверская, 1",
            "⚖️ 25.5 kg",
            "📏 Not specified",
            "🏷️ No tags",
            "💰 15000 ₽",
            "📅 10.08.2025",
            "🆔 ID: abcdef12-1234-1234-1234-123456789abc",
        ];
        let mut cursor = 0;
        for needle in expected_order {
            let found = text[cursor..].find(needle).unwrap_or_else(|| panic!("missing or out of order: {}", needle));
            cursor += found + needle.len();
        }
        assert!(!text.contains("Telegram: "));
    }

    #[test]
    fn test_driver_order_block_hides_ids() {
        let text = format_orders_driver(&[sample_order()]);
        assert!(text.contains("⚖️ 25.5 kg | 💰 15000 ₽"));
        assert!(!text.contains("abcdef12"));
        assert!(!text.contains("No tags"));
    }

    #[test]
    fn test_empty_lists() {
        assert_eq!(format_orders_admin(&[]), "📋 No orders yet");
        assert_eq!(format_customers(&[]), "👥 No customers yet");
        assert_eq!(format_drivers(&[]), "🚚 No drivers yet");
    }

    #[test]
    fn test_driver_block() {
        let driver = Driver {
            uuid: Uuid::new_v4(),
            name: "Petr".into(),
            telegram_id: 77,
            telegram_tag: Some("@petr".into()),
            city: Some(CityRef {
                uuid: Uuid::new_v4(),
                name: "Казань".into(),
            }),
            notification_enabled: false,
            created_at: Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 0).unwrap(),
        };
        let text = format_drivers(&[driver]);
        assert!(text.contains("🏙️ City: Казань"));
        assert!(text.contains("🔕 Notifications off"));
        assert!(text.contains("📅 Registered: 02.01.2025 03:04"));
    }

    #[test]
    fn test_driver_updated_messages() {
        let request = DriverSettingsRequest {
            driver_uuid: Uuid::parse_str("12345678-1234-1234-1234-123456789abc").unwrap(),
            city: CityChange::Clear,
            notification_enabled: None,
        };
        let text = format_driver_updated(&request);
        assert!(text.contains("UUID: 12345678"));
        assert!(text.contains("city cleared"));
        assert!(text.contains("notifications unchanged"));
    }

    fn words(text: &str) -> Vec<&str> {
        text.split_whitespace().collect()
    }

    #[test]
    fn test_split_short_text_is_untouched() {
        assert_eq!(split_message("  hello\nworld ", 100), vec!["hello\nworld".to_string()]);
        assert!(split_message("   ", 100).is_empty());
    }

    #[test]
    fn test_split_on_line_boundaries() {
        let text = "aaaa\nbbbb\ncccc\ndddd";
        let parts = split_message(text, 9);
        assert_eq!(parts, vec!["aaaa\nbbbb", "cccc\ndddd"]);
    }

    #[test]
    fn test_split_long_line_on_words() {
        let text = "short\none two three four five six\nend";
        let parts = split_message(text, 10);
        assert!(parts.iter().all(|p| p.chars().count() <= 10), "{:?}", parts);
        assert_eq!(words(&parts.join("\n")), words(text));
    }

    #[test]
    fn test_split_oversized_word_stands_alone() {
        let long_word = "x".repeat(25);
        let text = format!("a b {} c d", long_word);
        let parts = split_message(&text, 10);
        assert!(parts.contains(&long_word));
        for part in &parts {
            assert!(part.chars().count() <= 10 || *part == long_word);
        }
        assert_eq!(words(&parts.join("\n")), words(&text));
    }

    #[test]
    fn test_split_counts_characters_not_bytes() {
        let line = "Привет мир ".repeat(50);
        let parts = split_message(&line, 40);
        assert!(parts.iter().all(|p| p.chars().count() <= 40));
        assert_eq!(words(&parts.join("\n")), words(&line));
    }

    #[test]
    fn test_split_round_trip_over_order_listings() {
        let orders: Vec<Order> = (0..60).map(|_| sample_order()).collect();
        let text = format_orders_admin(&orders);
        for max in [50, 200, 1000, DEFAULT_MAX_MESSAGE_LEN] {
            let parts = split_message(&text, max);
            assert!(parts.len() > 1);
            assert!(parts.iter().all(|p| p.chars().count() <= max));
            assert_eq!(words(&parts.join("\n")), words(&text));
        }
    }
}
