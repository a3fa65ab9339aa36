//! Command parser - Decodes admin chat messages into typed requests
//!
//! A command message is a block of lines. The first line carries the command
//! key; the remaining lines are fields in a fixed order. Each line is trimmed,
//! and for optional fields a lone `-` or an empty line means "not given".

use chrono::NaiveDate;
use uuid::Uuid;

use crate::application::errors::ParseError;
use crate::domain::entities::{
    CityChange, CreateOrderRequest, Dimensions, DriverSettingsRequest, NewCustomer, OrderStatus,
};

/// Lines in the simplified `ADD_ORDER` message, key included.
pub const ADD_ORDER_LINES: usize = 10;
/// Lines in the extended `ADD_ORDER` message with dimensions, tags and date.
pub const ADD_ORDER_EXTENDED_LINES: usize = 15;
pub const ADD_USER_LINES: usize = 3;
pub const SET_CITY_AND_NOTIFICATION_LINES: usize = 2;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Fixed set of command keys understood by the admin bot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKey {
    AddUser,
    AddOrder,
    SetCityAndNotification,
    ArchiveOrder,
    ActivateOrder,
}

impl CommandKey {
    pub const ALL: [CommandKey; 5] = [
        CommandKey::AddUser,
        CommandKey::AddOrder,
        CommandKey::SetCityAndNotification,
        CommandKey::ArchiveOrder,
        CommandKey::ActivateOrder,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CommandKey::AddUser => "ADD_USER",
            CommandKey::AddOrder => "ADD_ORDER",
            CommandKey::SetCityAndNotification => "SET_CITY_AND_NOTIFICATION",
            CommandKey::ArchiveOrder => "ARCHIVE_ORDER",
            CommandKey::ActivateOrder => "ACTIVATE_ORDER",
        }
    }

    /// Classify a message by the first token of its first line.
    pub fn classify(text: &str) -> Option<CommandKey> {
        let token = text.trim_start().split_whitespace().next()?;
        Self::ALL.into_iter().find(|key| key.as_str() == token)
    }
}

/// A decoded admin command
#[derive(Debug, Clone, PartialEq)]
pub enum AdminCommand {
    AddCustomer(NewCustomer),
    AddOrder(CreateOrderRequest),
    SetCityAndNotification(DriverSettingsRequest),
    SetOrderStatus { order_uuid: Uuid, status: OrderStatus },
}

/// Parse any admin command message.
pub fn parse_command(text: &str) -> Result<AdminCommand, ParseError> {
    let key = match CommandKey::classify(text) {
        Some(key) => key,
        None => {
            let first = text.trim().lines().next().unwrap_or("").trim();
            if first.is_empty() {
                return Err(ParseError::Empty);
            }
            return Err(ParseError::UnknownCommand(first.to_string()));
        }
    };

    match key {
        CommandKey::AddUser => decode_add_user(text).map(AdminCommand::AddCustomer),
        CommandKey::AddOrder => decode_add_order(text).map(AdminCommand::AddOrder),
        CommandKey::SetCityAndNotification => {
            decode_set_city_and_notification(text).map(AdminCommand::SetCityAndNotification)
        }
        CommandKey::ArchiveOrder | CommandKey::ActivateOrder => {
            let (order_uuid, status) = decode_order_status(text)?;
            Ok(AdminCommand::SetOrderStatus { order_uuid, status })
        }
    }
}

/// `ADD_USER` / name / phone / [telegram id] / [telegram tag]
pub fn decode_add_user(text: &str) -> Result<NewCustomer, ParseError> {
    let lines = split_lines(text);
    expect_key(&lines, CommandKey::AddUser)?;
    expect_lines(&lines, CommandKey::AddUser, ADD_USER_LINES)?;

    let name = lines[1];
    let phone = lines[2];
    if name.is_empty() || phone.is_empty() {
        return Err(ParseError::EmptyField(if name.is_empty() { "name" } else { "phone" }));
    }

    let telegram_id = optional(lines.get(3).copied()).and_then(|raw| match raw.parse::<i64>() {
        Ok(id) => Some(id),
        Err(_) => {
            tracing::warn!("Ignoring unparseable telegram id '{}' in ADD_USER", raw);
            None
        }
    });
    let telegram_tag = optional(lines.get(4).copied()).map(str::to_string);

    Ok(NewCustomer {
        name: name.to_string(),
        phone: phone.to_string(),
        telegram_id,
        telegram_tag,
    })
}

/// `ADD_ORDER` in either the simplified (10 lines) or extended (15 lines) layout.
///
/// Simplified: title, description, weight, from city, from address, to city,
/// to address, price, customer UUID. Every field is required.
///
/// Extended: title, description, weight, length, width, height, from city,
/// from address, to city, to address, tags, price, available from, customer
/// UUID. Dimensions, locations, tags and date may be `-`.
pub fn decode_add_order(text: &str) -> Result<CreateOrderRequest, ParseError> {
    let lines = split_lines(text);
    expect_key(&lines, CommandKey::AddOrder)?;
    if lines.len() > ADD_ORDER_LINES {
        // Anything longer than the simplified layout is an extended order
        expect_lines(&lines, CommandKey::AddOrder, ADD_ORDER_EXTENDED_LINES)?;
        decode_extended_order(&lines)
    } else {
        expect_lines(&lines, CommandKey::AddOrder, ADD_ORDER_LINES)?;
        decode_simplified_order(&lines)
    }
}

fn decode_simplified_order(lines: &[&str]) -> Result<CreateOrderRequest, ParseError> {
    let title = required(lines[1], "title")?;
    let description = required(lines[2], "description")?;
    let weight_kg = parse_decimal(lines[3], "weight")?;
    let from_city = required(lines[4], "from city")?;
    let from_address = required(lines[5], "from address")?;
    let to_city = required(lines[6], "to city")?;
    let to_address = required(lines[7], "to address")?;
    let price = parse_decimal(lines[8], "price")?;
    let customer_uuid = parse_uuid(lines[9], "customer")?;

    Ok(CreateOrderRequest {
        title: title.to_string(),
        description: description.to_string(),
        weight_kg,
        dimensions: None,
        from_city_name: Some(from_city.to_string()),
        from_address: Some(from_address.to_string()),
        to_city_name: Some(to_city.to_string()),
        to_address: Some(to_address.to_string()),
        tags: Vec::new(),
        price,
        available_from: None,
        customer_uuid,
    })
}

fn decode_extended_order(lines: &[&str]) -> Result<CreateOrderRequest, ParseError> {
    let title = required(lines[1], "title")?;
    let description = required(lines[2], "description")?;
    let weight_kg = parse_decimal(lines[3], "weight")?;

    let length = parse_optional_decimal(lines[4], "length")?;
    let width = parse_optional_decimal(lines[5], "width")?;
    let height = parse_optional_decimal(lines[6], "height")?;
    let dimensions = Dimensions::from_parts(length, width, height);
    if dimensions.is_none() && (length.is_some() || width.is_some() || height.is_some()) {
        return Err(ParseError::PartialDimensions);
    }

    let price = parse_decimal(lines[12], "price")?;
    let customer_uuid = parse_uuid(lines[14], "customer")?;

    Ok(CreateOrderRequest {
        title: title.to_string(),
        description: description.to_string(),
        weight_kg,
        dimensions,
        from_city_name: optional(Some(lines[7])).map(str::to_string),
        from_address: optional(Some(lines[8])).map(str::to_string),
        to_city_name: optional(Some(lines[9])).map(str::to_string),
        to_address: optional(Some(lines[10])).map(str::to_string),
        tags: parse_tags(lines[11]),
        price,
        available_from: parse_date(lines[13]),
        customer_uuid,
    })
}

/// `SET_CITY_AND_NOTIFICATION` / `<driver uuid>, <city>, <flag>`
///
/// City: empty keeps the current one, `-` clears it. Flag: empty leaves
/// notifications unchanged.
pub fn decode_set_city_and_notification(text: &str) -> Result<DriverSettingsRequest, ParseError> {
    let lines = split_lines(text);
    expect_key(&lines, CommandKey::SetCityAndNotification)?;
    expect_lines(&lines, CommandKey::SetCityAndNotification, SET_CITY_AND_NOTIFICATION_LINES)?;

    let mut params = lines[1].split(',').map(str::trim);
    let driver_token = params.next().unwrap_or("");
    if driver_token.is_empty() {
        return Err(ParseError::EmptyField("driver UUID"));
    }
    let driver_uuid = parse_uuid(driver_token, "driver")?;
    let city = CityChange::from_token(params.next().unwrap_or(""));
    let notification_enabled = parse_notification_flag(params.next().unwrap_or(""))?;

    Ok(DriverSettingsRequest {
        driver_uuid,
        city,
        notification_enabled,
    })
}

/// `ARCHIVE_ORDER <uuid>` or `ACTIVATE_ORDER <uuid>`
pub fn decode_order_status(text: &str) -> Result<(Uuid, OrderStatus), ParseError> {
    let first = text.trim().lines().next().unwrap_or("").trim();
    let (token, argument) = match first.split_once(char::is_whitespace) {
        Some((token, rest)) => (token, rest.trim()),
        None => (first, ""),
    };

    let (command, status) = match token {
        "ARCHIVE_ORDER" => ("ARCHIVE_ORDER", OrderStatus::Archived),
        "ACTIVATE_ORDER" => ("ACTIVATE_ORDER", OrderStatus::Active),
        _ => {
            return Err(ParseError::WrongKey {
                expected: "ARCHIVE_ORDER or ACTIVATE_ORDER",
            })
        }
    };
    if argument.is_empty() {
        return Err(ParseError::MissingArgument { command });
    }

    Ok((parse_uuid(argument, "order")?, status))
}

/// Recognises the localized on/off tokens. Empty means "leave unchanged".
pub fn parse_notification_flag(token: &str) -> Result<Option<bool>, ParseError> {
    let token = token.trim();
    if token.is_empty() {
        return Ok(None);
    }
    match token.to_lowercase().as_str() {
        "вкл" | "включить" | "true" | "1" | "on" => Ok(Some(true)),
        "выкл" | "выключить" | "false" | "0" | "off" => Ok(Some(false)),
        _ => Err(ParseError::InvalidNotificationFlag(token.to_string())),
    }
}

/// Comma-separated tags, each trimmed; blanks dropped.
pub fn parse_tags(value: &str) -> Vec<String> {
    match optional(Some(value)) {
        Some(value) => value
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect(),
        None => Vec::new(),
    }
}

/// `YYYY-MM-DD`. Anything else, including `-`, is "not set".
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    optional(Some(value)).and_then(|v| NaiveDate::parse_from_str(v, DATE_FORMAT).ok())
}

fn split_lines(text: &str) -> Vec<&str> {
    text.trim().lines().map(str::trim).collect()
}

fn expect_key(lines: &[&str], key: CommandKey) -> Result<(), ParseError> {
    if lines.first().copied() != Some(key.as_str()) {
        return Err(ParseError::WrongKey {
            expected: key.as_str(),
        });
    }
    Ok(())
}

fn expect_lines(lines: &[&str], key: CommandKey, expected: usize) -> Result<(), ParseError> {
    if lines.len() < expected {
        return Err(ParseError::NotEnoughLines {
            command: key.as_str(),
            expected,
            got: lines.len(),
        });
    }
    Ok(())
}

fn optional(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty() && *v != "-")
}

fn required<'a>(value: &'a str, field: &'static str) -> Result<&'a str, ParseError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ParseError::EmptyField(field));
    }
    Ok(value)
}

/// Accepts `25.5` and `25,5`. A comma is a decimal separator only when it is
/// the sole separator with one or two digits after it, so `15,000` is
/// rejected rather than read as 15. Infinities and NaN are rejected.
fn parse_decimal(value: &str, field: &'static str) -> Result<f64, ParseError> {
    let value = required(value, field)?;
    let invalid = || ParseError::InvalidNumber {
        field,
        value: value.to_string(),
    };

    let normalized = match value.split_once(',') {
        None => value.to_string(),
        Some((whole, fraction)) => {
            let digits = whole.strip_prefix('-').unwrap_or(whole);
            let is_decimal_comma = !digits.is_empty()
                && digits.bytes().all(|b| b.is_ascii_digit())
                && (1..=2).contains(&fraction.len())
                && fraction.bytes().all(|b| b.is_ascii_digit());
            if !is_decimal_comma {
                return Err(invalid());
            }
            format!("{}.{}", whole, fraction)
        }
    };

    match normalized.parse::<f64>() {
        Ok(number) if number.is_finite() => Ok(number),
        _ => Err(invalid()),
    }
}

fn parse_optional_decimal(value: &str, field: &'static str) -> Result<Option<f64>, ParseError> {
    optional(Some(value))
        .map(|v| parse_decimal(v, field))
        .transpose()
}

fn parse_uuid(value: &str, field: &'static str) -> Result<Uuid, ParseError> {
    let value = required(value, field)?;
    Uuid::parse_str(value).map_err(|_| ParseError::InvalidUuid {
        field,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const CUSTOMER: &str = "12345678-1234-1234-1234-123456789abc";

    #[test]
    fn test_add_user_with_dashes() {
        let cmd = parse_command("ADD_USER\nIvan\n+79990001111\n-\n-").unwrap();
        assert_eq!(
            cmd,
            AdminCommand::AddCustomer(NewCustomer {
                name: "Ivan".into(),
                phone: "+79990001111".into(),
                telegram_id: None,
                telegram_tag: None,
            })
        );
    }

    #[test]
    fn test_add_user_full() {
        let customer = decode_add_user("ADD_USER\n  Ivan Ivanov \n+79001234567\n123456789\n@ivan").unwrap();
        assert_eq!(customer.name, "Ivan Ivanov");
        assert_eq!(customer.telegram_id, Some(123456789));
        assert_eq!(customer.telegram_tag.as_deref(), Some("@ivan"));
    }

    #[test]
    fn test_add_user_ignores_garbage_telegram_id() {
        let customer = decode_add_user("ADD_USER\nIvan\n+7900\nnot-a-number\n@ivan").unwrap();
        assert_eq!(customer.telegram_id, None);
        assert_eq!(customer.telegram_tag.as_deref(), Some("@ivan"));
    }

    #[test]
    fn test_add_user_too_short() {
        let err = decode_add_user("ADD_USER\nIvan").unwrap_err();
        assert_eq!(
            err,
            ParseError::NotEnoughLines {
                command: "ADD_USER",
                expected: 3,
                got: 2
            }
        );
        assert!(err.to_string().contains("at least 3 lines"));
    }

    #[test]
    fn test_add_user_empty_phone() {
        let err = decode_add_user("ADD_USER\nIvan\n   \n").unwrap_err();
        // Trailing blank lines are trimmed away with the message.
        assert!(matches!(err, ParseError::NotEnoughLines { .. }));

        let err = decode_add_user("ADD_USER\nIvan\n \n123").unwrap_err();
        assert_eq!(err, ParseError::EmptyField("phone"));
    }

    #[test]
    fn test_add_user_wrong_key_line() {
        let err = decode_add_user("ADD_USER now\nIvan\n+7900").unwrap_err();
        assert_eq!(err, ParseError::WrongKey { expected: "ADD_USER" });
    }

    fn simplified_order(weight: &str, price: &str) -> String {
        format!(
            "ADD_ORDER\nДоставка мебели\nДиван и стол\n{}\nМосква\nул. Тверская, д. 1\nСанкт-Петербург\nНевский проспект, д. 10\n{}\n{}",
            weight, price, CUSTOMER
        )
    }

    #[test]
    fn test_add_order_simplified() {
        let req = decode_add_order(&simplified_order("25.5", "15000")).unwrap();
        assert_eq!(req.title, "Доставка мебели");
        assert_eq!(req.weight_kg, 25.5);
        assert_eq!(req.price, 15000.0);
        assert_eq!(req.from_city_name.as_deref(), Some("Москва"));
        assert_eq!(req.to_address.as_deref(), Some("Невский проспект, д. 10"));
        assert_eq!(req.customer_uuid, Uuid::parse_str(CUSTOMER).unwrap());
        assert!(req.tags.is_empty());
        assert!(req.dimensions.is_none());
    }

    #[test]
    fn test_add_order_decimal_comma() {
        let req = decode_add_order(&simplified_order("25,5", "100")).unwrap();
        assert_eq!(req.weight_kg, 25.5);
    }

    #[test]
    fn test_add_order_thousands_separator_rejected() {
        let err = decode_add_order(&simplified_order("10", "15,000")).unwrap_err();
        assert_eq!(
            err,
            ParseError::InvalidNumber {
                field: "price",
                value: "15,000".into()
            }
        );
        let err = decode_add_order(&simplified_order("1,500", "100")).unwrap_err();
        assert!(matches!(err, ParseError::InvalidNumber { field: "weight", .. }));

        for bad in ["1,5,0", "1.5,0", ",5", "12,"] {
            assert!(parse_decimal(bad, "weight").is_err(), "{}", bad);
        }
        assert_eq!(parse_decimal("0,75", "weight").unwrap(), 0.75);
        assert_eq!(parse_decimal("1500", "weight").unwrap(), 1500.0);
    }

    #[test]
    fn test_add_order_bad_numbers() {
        let err = decode_add_order(&simplified_order("heavy", "100")).unwrap_err();
        assert_eq!(
            err,
            ParseError::InvalidNumber {
                field: "weight",
                value: "heavy".into()
            }
        );
        let err = decode_add_order(&simplified_order("10", "inf")).unwrap_err();
        assert!(matches!(err, ParseError::InvalidNumber { field: "price", .. }));
    }

    #[test]
    fn test_add_order_too_few_lines() {
        let err = decode_add_order("ADD_ORDER\nTitle\nDescription\n10").unwrap_err();
        assert_eq!(
            err,
            ParseError::NotEnoughLines {
                command: "ADD_ORDER",
                expected: 10,
                got: 4
            }
        );
    }

    #[test]
    fn test_add_order_between_layouts_wants_extended() {
        // extended layout with the date line forgotten
        let text = format!(
            "ADD_ORDER\nT\nD\n10\n-\n-\n-\nМосква\na\nКазань\nb\n-\n100\n{}",
            CUSTOMER
        );
        let err = decode_add_order(&text).unwrap_err();
        assert_eq!(
            err,
            ParseError::NotEnoughLines {
                command: "ADD_ORDER",
                expected: 15,
                got: 14
            }
        );

        let text = format!("{}\nextra", simplified_order("10", "100"));
        assert!(matches!(
            decode_add_order(&text).unwrap_err(),
            ParseError::NotEnoughLines { expected: 15, got: 11, .. }
        ));
    }

    #[test]
    fn test_add_order_bad_customer_uuid() {
        let text = simplified_order("10", "100").replace(CUSTOMER, "customer-42");
        let err = decode_add_order(&text).unwrap_err();
        assert!(matches!(err, ParseError::InvalidUuid { field: "customer", .. }));
    }

    #[test]
    fn test_add_order_extended() {
        let text = format!(
            "ADD_ORDER\nPallets\nTwo euro pallets\n800\n120\n80\n100\nМосква\n-\n-\nСклад на МКАД\nрефрижератор, ,  хрупкое \n42000\n2025-08-10\n{}",
            CUSTOMER
        );
        let req = decode_add_order(&text).unwrap();
        assert_eq!(
            req.dimensions,
            Some(Dimensions {
                length_cm: 120.0,
                width_cm: 80.0,
                height_cm: 100.0
            })
        );
        assert_eq!(req.from_city_name.as_deref(), Some("Москва"));
        assert_eq!(req.from_address, None);
        assert_eq!(req.to_city_name, None);
        assert_eq!(req.to_address.as_deref(), Some("Склад на МКАД"));
        assert_eq!(req.tags, vec!["рефрижератор".to_string(), "хрупкое".to_string()]);
        assert_eq!(req.available_from, NaiveDate::from_ymd_opt(2025, 8, 10));
    }

    #[test]
    fn test_add_order_extended_partial_dimensions() {
        let text = format!(
            "ADD_ORDER\nT\nD\n1\n120\n-\n100\n-\n-\n-\n-\n-\n10\n-\n{}",
            CUSTOMER
        );
        assert_eq!(decode_add_order(&text).unwrap_err(), ParseError::PartialDimensions);
    }

    #[test]
    fn test_bad_date_is_not_an_error() {
        assert_eq!(parse_date("tomorrow"), None);
        assert_eq!(parse_date("-"), None);
        assert_eq!(parse_date("10.08.2025"), None);
        assert_eq!(parse_date(" 2025-08-10 "), NaiveDate::from_ymd_opt(2025, 8, 10));
    }

    #[test]
    fn test_set_city_and_notification() {
        let uuid = "12345678-1234-1234-1234-123456789abc";
        let req = decode_set_city_and_notification(&format!(
            "SET_CITY_AND_NOTIFICATION\n{}, Moscow, вкл",
            uuid
        ))
        .unwrap();
        assert_eq!(req.driver_uuid, Uuid::parse_str(uuid).unwrap());
        assert_eq!(req.city, CityChange::Set("Moscow".into()));
        assert_eq!(req.notification_enabled, Some(true));

        let req = decode_set_city_and_notification(&format!("SET_CITY_AND_NOTIFICATION\n{}, -, ", uuid)).unwrap();
        assert_eq!(req.city, CityChange::Clear);
        assert_eq!(req.notification_enabled, None);

        let req = decode_set_city_and_notification(&format!("SET_CITY_AND_NOTIFICATION\n{},, ВЫКЛ", uuid)).unwrap();
        assert_eq!(req.city, CityChange::Keep);
        assert_eq!(req.notification_enabled, Some(false));

        let req = decode_set_city_and_notification(&format!("SET_CITY_AND_NOTIFICATION\n{}", uuid)).unwrap();
        assert_eq!(req.city, CityChange::Keep);
        assert_eq!(req.notification_enabled, None);
    }

    #[test]
    fn test_set_city_and_notification_errors() {
        let err = decode_set_city_and_notification("SET_CITY_AND_NOTIFICATION").unwrap_err();
        assert!(matches!(err, ParseError::NotEnoughLines { expected: 2, .. }));

        let err = decode_set_city_and_notification("SET_CITY_AND_NOTIFICATION\n, Moscow").unwrap_err();
        assert_eq!(err, ParseError::EmptyField("driver UUID"));

        let err = decode_set_city_and_notification("SET_CITY_AND_NOTIFICATION\nabc, Moscow").unwrap_err();
        assert!(matches!(err, ParseError::InvalidUuid { field: "driver", .. }));

        let err = decode_set_city_and_notification(
            "SET_CITY_AND_NOTIFICATION\n12345678-1234-1234-1234-123456789abc, Moscow, maybe",
        )
        .unwrap_err();
        assert_eq!(err, ParseError::InvalidNotificationFlag("maybe".into()));
    }

    #[test]
    fn test_notification_flag_tokens() {
        for on in ["вкл", "включить", "true", "1", "on", "ON", "Вкл"] {
            assert_eq!(parse_notification_flag(on), Ok(Some(true)), "{}", on);
        }
        for off in ["выкл", "выключить", "false", "0", "off"] {
            assert_eq!(parse_notification_flag(off), Ok(Some(false)), "{}", off);
        }
        assert_eq!(parse_notification_flag("  "), Ok(None));
    }

    #[test]
    fn test_order_status_commands() {
        let uuid = Uuid::new_v4();
        assert_eq!(
            parse_command(&format!("ARCHIVE_ORDER {}", uuid)).unwrap(),
            AdminCommand::SetOrderStatus {
                order_uuid: uuid,
                status: OrderStatus::Archived
            }
        );
        assert_eq!(
            parse_command(&format!("  ACTIVATE_ORDER   {}  ", uuid)).unwrap(),
            AdminCommand::SetOrderStatus {
                order_uuid: uuid,
                status: OrderStatus::Active
            }
        );
        assert_eq!(
            parse_command("ARCHIVE_ORDER").unwrap_err(),
            ParseError::MissingArgument {
                command: "ARCHIVE_ORDER"
            }
        );
        assert!(matches!(
            parse_command("ACTIVATE_ORDER 1234").unwrap_err(),
            ParseError::InvalidUuid { field: "order", .. }
        ));
    }

    #[test]
    fn test_unknown_and_empty() {
        assert_eq!(
            parse_command("DELETE_ORDER 1").unwrap_err(),
            ParseError::UnknownCommand("DELETE_ORDER 1".into())
        );
        assert_eq!(parse_command("   \n ").unwrap_err(), ParseError::Empty);
        assert_eq!(CommandKey::classify("ADD_USERS\nx"), None);
        assert_eq!(CommandKey::classify("ADD_USER\nx"), Some(CommandKey::AddUser));
    }
}
