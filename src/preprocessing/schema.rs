//! Схема выгрузки объявлений и справочники для очистки.
//!
//! Все таблицы неизменяемы: ключи справочников записаны так, как они
//! приходят в польской выгрузке, значения соответствуют каноническим
//! английским категориям.

/// Колонка признака правого руля
pub const RIGHT_HAND_DRIVE: &str = "Kierownica po prawej (Anglik)";

/// Значение "да" в выгрузке
pub const YES: &str = "Tak";

/// Исходная колонка -> каноническое имя, в порядке проекции
pub const COLUMN_MAPPING: [(&str, &str); 19] = [
    ("Marka pojazdu", BRAND),
    ("Model pojazdu", MODEL),
    ("Rok produkcji", YEAR_PRODUCTION),
    ("Przebieg", MILEAGE),
    ("Pojemność skokowa", ENGINE_CAPACITY),
    ("Rodzaj paliwa", FUEL_TYPE),
    ("Moc", POWER),
    ("Skrzynia biegów", GEARBOX),
    ("Napęd", DRIVE_TYPE),
    ("Typ nadwozia", BODY_TYPE),
    ("Liczba drzwi", DOORS),
    ("Kolor", COLOR),
    ("Metalik", METALLIC),
    ("Kraj pochodzenia", COUNTRY_ORIGIN),
    ("Pierwszy właściciel", FIRST_OWNER),
    ("Bezwypadkowy", ACCIDENT_FREE),
    ("Stan", CONDITION),
    ("Cena", PRICE),
    ("Waluta", CURRENCY),
];

pub const BRAND: &str = "brand";
pub const MODEL: &str = "model";
pub const YEAR_PRODUCTION: &str = "year_production";
pub const MILEAGE: &str = "mileage";
pub const ENGINE_CAPACITY: &str = "engine_capacity";
pub const FUEL_TYPE: &str = "fuel_type";
pub const POWER: &str = "power";
pub const GEARBOX: &str = "gearbox";
pub const AUTOMATIC_GEARBOX: &str = "automatic_gearbox";
pub const DRIVE_TYPE: &str = "drive_type";
pub const BODY_TYPE: &str = "body_type";
pub const DOORS: &str = "doors";
pub const DOORS_5: &str = "doors_5";
pub const COLOR: &str = "color";
pub const METALLIC: &str = "metallic";
pub const COUNTRY_ORIGIN: &str = "country_origin";
pub const FIRST_OWNER: &str = "first_owner";
pub const ACCIDENT_FREE: &str = "accident_free";
pub const CONDITION: &str = "condition";
pub const PRICE: &str = "price";
pub const CURRENCY: &str = "currency";

/// Колонки, которые не используются после проекции
pub const UNUSED_COLUMNS: [&str; 4] = [MODEL, METALLIC, COUNTRY_ORIGIN, FIRST_OWNER];

/// Марки с достаточным числом объявлений
pub const BRANDS: [&str; 30] = [
    "Alfa Romeo",
    "Audi",
    "BMW",
    "Chevrolet",
    "Citroën",
    "Dacia",
    "Fiat",
    "Ford",
    "Honda",
    "Hyundai",
    "Jaguar",
    "Jeep",
    "Kia",
    "Land Rover",
    "Lexus",
    "Mazda",
    "Mercedes-Benz",
    "Mini",
    "Mitsubishi",
    "Nissan",
    "Opel",
    "Peugeot",
    "Porsche",
    "Renault",
    "Seat",
    "Skoda",
    "Suzuki",
    "Toyota",
    "Volkswagen",
    "Volvo",
];

pub const MIN_YEAR_EXCLUSIVE: i64 = 1999;
pub const MAX_MILEAGE_EXCLUSIVE: i64 = 800_000;
pub const MIN_POWER_EXCLUSIVE: i64 = 4;
pub const MAX_POWER_EXCLUSIVE: i64 = 1501;
pub const MAX_DOORS: i64 = 5;

pub const MILEAGE_UNIT: &str = " km";
pub const ENGINE_CAPACITY_UNIT: &str = " cm3";
pub const POWER_UNIT: &str = " KM";

/// Бензин+CNG и водород: слишком редкие виды топлива
pub const EXCLUDED_FUEL_TYPES: [&str; 2] = ["Benzyna+CNG", "Wodór"];

pub const GEARBOX_MAPPING: [(&str, i64); 2] = [("Manualna", 0), ("Automatyczna", 1)];

pub const DRIVE_TYPE_MAPPING: [(&str, &str); 5] = [
    ("Na przednie koła", "Front_wheel_drive"),
    ("Na tylne koła", "Rear_wheel_drive"),
    ("4x4 (stały)", "4x4"),
    ("4x4 (dołączany automatycznie)", "4x4"),
    ("4x4 (dołączany ręcznie)", "4x4"),
];

pub const BODY_TYPE_MAPPING: [(&str, &str); 5] = [
    ("Kombi", "Combi"),
    ("Kompakt", "Compact"),
    ("Auta miejskie", "City_cars"),
    ("Auta małe", "Small_cars"),
    ("Kabriolet", "Cabriolet"),
];

pub const COLOR_MAPPING: [(&str, &str); 17] = [
    ("Czarny", "Black"),
    ("Szary", "Gray"),
    ("Biały", "White"),
    ("Srebrny", "Silver"),
    ("Niebieski", "Blue"),
    ("Czerwony", "Red"),
    ("Inny kolor", "Other_color"),
    ("Granatowy", "Navy_blue"),
    ("Brązowy", "Brown"),
    ("Zielony", "Green"),
    ("Bordowy", "Burgundy"),
    ("Beżowy", "Beige"),
    ("Złoty", "Gold"),
    ("Błękitny", "Light_blue"),
    ("Pomarańczowy", "Orange"),
    ("Żółty", "Yellow"),
    ("Fioletowy", "Purple"),
];

pub const CONDITION_MAPPING: [(&str, &str); 4] = [
    ("Używane", "Used_cars"),
    ("Nowe", "New_cars"),
    ("Używany", "Used_cars"),
    ("Nowy", "New_cars"),
];

pub const PLN: &str = "PLN";
pub const EUR: &str = "EUR";
pub const ACCEPTED_CURRENCIES: [&str; 2] = [PLN, EUR];

/// Курс EUR -> PLN
pub const EUR_TO_PLN: f64 = 4.2077;

/// Категориальные поля, раскладываемые в индикаторы
pub const ENCODED_COLUMNS: [&str; 6] = [BRAND, FUEL_TYPE, DRIVE_TYPE, BODY_TYPE, COLOR, CONDITION];

/// Поиск по справочнику пар
pub fn lookup<V: Copy>(mapping: &[(&str, V)], key: &str) -> Option<V> {
    mapping.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
}

/// Колонки, которые должна содержать таблица на входе очистки
pub fn projected_columns() -> impl Iterator<Item = &'static str> {
    let mapping: &'static [(&str, &str)] = &COLUMN_MAPPING;
    mapping.iter().map(|(_, canonical)| *canonical)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mappings_have_expected_targets() {
        let drive: std::collections::BTreeSet<_> =
            DRIVE_TYPE_MAPPING.iter().map(|(_, v)| *v).collect();
        assert_eq!(drive.len(), 3);

        let conditions: std::collections::BTreeSet<_> =
            CONDITION_MAPPING.iter().map(|(_, v)| *v).collect();
        assert_eq!(conditions.into_iter().collect::<Vec<_>>(), vec!["New_cars", "Used_cars"]);
    }

    #[test]
    fn lookup_is_exact_match() {
        assert_eq!(lookup(&COLOR_MAPPING, "Złoty"), Some("Gold"));
        assert_eq!(lookup(&COLOR_MAPPING, "złoty"), None);
        assert_eq!(lookup(&GEARBOX_MAPPING, "Automatyczna"), Some(1));
    }
}
