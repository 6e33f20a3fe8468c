//! Сквозные тесты: CSV выгрузка -> проекция -> очистка -> модель цены

use listings_ml::io::read_csv;
use listings_ml::models::{build_estimator, predict_model, train_model, train_test_split};
use listings_ml::preprocessing::schema::*;
use listings_ml::preprocessing::{prepare_data, FieldCleaner};
use listings_ml::{CleanOptions, EstimatorSpec, ParamGrid, PipelineError, SearchStrategy, Table, Value};

/// Объявление в порядке COLUMN_MAPPING, последним идет признак правого руля
struct Listing {
    brand: &'static str,
    year: &'static str,
    mileage: &'static str,
    gearbox: &'static str,
    drive: &'static str,
    body: &'static str,
    doors: &'static str,
    color: &'static str,
    accident_free: &'static str,
    price: &'static str,
    currency: &'static str,
    rhd: &'static str,
}

impl Listing {
    fn reference() -> Self {
        Self {
            brand: "Skoda",
            year: "2015",
            mileage: "120 000 km",
            gearbox: "Manualna",
            drive: "Na przednie koła",
            body: "Kombi",
            doors: "5",
            color: "Srebrny",
            accident_free: "Tak",
            price: "25000",
            currency: "PLN",
            rhd: "",
        }
    }

    fn csv_line(&self) -> String {
        [
            self.brand, "Octavia", self.year, self.mileage, "1598 cm3", "Benzyna", "95 KM",
            self.gearbox, self.drive, self.body, self.doors, self.color, "Tak", "Polska", "",
            self.accident_free, "Używane", self.price, self.currency, self.rhd,
        ]
        .join(",")
    }
}

fn export(listings: &[Listing]) -> Table {
    let mut header: Vec<&str> = COLUMN_MAPPING.iter().map(|(source, _)| *source).collect();
    header.push(RIGHT_HAND_DRIVE);

    let mut raw = header.join(",");
    for listing in listings {
        raw.push('\n');
        raw.push_str(&listing.csv_line());
    }
    read_csv(raw.as_bytes()).unwrap()
}

fn sample_export() -> Table {
    export(&[
        Listing::reference(),
        Listing { rhd: "Tak", ..Listing::reference() },
        Listing {
            brand: "Audi",
            price: "1000",
            currency: "EUR",
            accident_free: "",
            ..Listing::reference()
        },
        Listing { brand: "Trabant", ..Listing::reference() },
        Listing {
            brand: "BMW",
            gearbox: "Automatyczna",
            drive: "Na tylne koła",
            body: "Kompakt",
            doors: "6",
            color: "Czarny",
            ..Listing::reference()
        },
        Listing { currency: "USD", ..Listing::reference() },
        Listing { price: "do negocjacji", ..Listing::reference() },
    ])
}

fn cell<'a>(table: &'a Table, row: usize, column: &str) -> &'a Value {
    &table.rows[row][table.column_index(column).unwrap()]
}

fn run(raw: &Table, options: CleanOptions) -> Table {
    let projected = prepare_data(raw).unwrap();
    FieldCleaner::new(options).run(&projected).unwrap().0
}

#[test]
fn cleans_export_with_default_options() {
    let raw = sample_export();
    let projected = prepare_data(&raw).unwrap();
    assert_eq!(projected.len(), 6);
    assert!(projected.column_index(RIGHT_HAND_DRIVE).is_none());

    let (out, report) = FieldCleaner::new(CleanOptions::default()).run(&projected).unwrap();

    assert_eq!(out.len(), 3);
    assert_eq!(report.total_dropped(), 3);

    // исходный эталонный ряд
    assert_eq!(cell(&out, 0, MILEAGE), &Value::Int(120_000));
    assert_eq!(cell(&out, 0, POWER), &Value::Int(95));
    assert_eq!(cell(&out, 0, ENGINE_CAPACITY), &Value::Int(1598));
    assert_eq!(cell(&out, 0, AUTOMATIC_GEARBOX), &Value::Int(0));
    assert_eq!(cell(&out, 0, DRIVE_TYPE), &Value::text("Front_wheel_drive"));
    assert_eq!(cell(&out, 0, PRICE), &Value::Int(25_000));

    // EUR -> PLN с отбрасыванием дробной части, пропуск в bezwypadkowy -> 0
    assert_eq!(cell(&out, 1, BRAND), &Value::text("Audi"));
    assert_eq!(cell(&out, 1, PRICE), &Value::Int(4207));
    assert_eq!(cell(&out, 1, ACCIDENT_FREE), &Value::Int(0));

    assert_eq!(cell(&out, 2, AUTOMATIC_GEARBOX), &Value::Int(1));
    assert_eq!(cell(&out, 2, DRIVE_TYPE), &Value::text("Rear_wheel_drive"));
    assert_eq!(cell(&out, 2, BODY_TYPE), &Value::text("Compact"));
    assert_eq!(cell(&out, 2, COLOR), &Value::text("Black"));
}

#[test]
fn output_rows_satisfy_invariants() {
    let out = run(&sample_export(), CleanOptions::default());

    for row in 0..out.len() {
        let brand = cell(&out, row, BRAND).as_str().unwrap();
        assert!(BRANDS.contains(&brand));

        let year = cell(&out, row, YEAR_PRODUCTION).as_i64().unwrap();
        assert!(year > 1999);

        let mileage = cell(&out, row, MILEAGE).as_i64().unwrap();
        assert!((0..800_000).contains(&mileage));

        let power = cell(&out, row, POWER).as_i64().unwrap();
        assert!(power > 4 && power < 1501);

        assert_eq!(cell(&out, row, CURRENCY), &Value::text(PLN));
        assert!(matches!(cell(&out, row, ACCIDENT_FREE), Value::Int(0 | 1)));
        assert!(cell(&out, row, PRICE).as_i64().unwrap() > 0);
    }
}

#[test]
fn binarizes_doors_and_one_hot_encodes() {
    let options = CleanOptions {
        one_hot_encode: true,
        binarize_doors: true,
    };
    let out = run(&sample_export(), options);

    // шестидверный BMW отброшен
    assert_eq!(out.len(), 2);
    assert_eq!(cell(&out, 0, DOORS_5), &Value::Int(1));

    for field in ENCODED_COLUMNS {
        assert!(out.column_index(field).is_none());
    }
    assert!(out.column_index(CURRENCY).is_none());

    // марки {Audi, Skoda}: Audi - опорная категория
    let brand_columns: Vec<_> = out.columns.iter().filter(|c| c.starts_with("brand_")).collect();
    assert_eq!(brand_columns, vec!["brand_Skoda"]);
    assert_eq!(cell(&out, 0, "brand_Skoda"), &Value::Int(1));
    assert_eq!(cell(&out, 1, "brand_Skoda"), &Value::Int(0));

    for row in &out.rows {
        assert!(row.iter().all(|v| v.as_f64().is_some()));
    }
}

#[test]
fn second_pass_is_rejected() {
    let once = run(&sample_export(), CleanOptions::default());
    let err = FieldCleaner::new(CleanOptions::default()).run(&once).unwrap_err();
    assert!(matches!(err, PipelineError::Schema { .. }));
}

#[test]
fn cleaned_listings_train_price_model() {
    const MILEAGES: [&str; 6] = [
        "15 000 km", "48 000 km", "90 500 km", "132 000 km", "187 000 km", "240 000 km",
    ];
    const YEARS: [&str; 5] = ["2008", "2011", "2014", "2017", "2020"];
    const PRICES: [&str; 6] = ["61000", "54000", "43500", "37000", "29000", "21500"];

    let listings: Vec<Listing> = (0..30)
        .map(|i| Listing {
            brand: if i % 2 == 0 { "Skoda" } else { "Toyota" },
            mileage: MILEAGES[i % 6],
            price: PRICES[i % 6],
            year: YEARS[i % 5],
            gearbox: if i % 3 == 0 { "Automatyczna" } else { "Manualna" },
            ..Listing::reference()
        })
        .collect();

    let options = CleanOptions {
        one_hot_encode: true,
        binarize_doors: true,
    };
    let cleaned = run(&export(&listings), options);
    assert_eq!(cleaned.len(), 30);

    let (train, test) = train_test_split(&cleaned, 0.2, 7).unwrap();
    assert_eq!(test.len(), 6);

    let features: Vec<String> = [MILEAGE, YEAR_PRODUCTION, AUTOMATIC_GEARBOX, "brand_Toyota"]
        .iter()
        .map(|c| c.to_string())
        .collect();
    let grid = ParamGrid::from([("alpha".to_string(), vec![0.1, 1.0, 10.0])]);

    let model = train_model(
        &train,
        PRICE,
        &features,
        build_estimator(&EstimatorSpec::Ridge { alpha: 1.0 }),
        3,
        SearchStrategy::Grid,
        &grid,
    )
    .unwrap();
    assert!(model.best_params.contains_key("alpha"));
    assert!(model.avg_score <= 0.0);

    let evaluation = predict_model(&model, &test, PRICE).unwrap();
    assert_eq!(evaluation.predictions.len(), 6);
    assert!(evaluation.mse.is_finite());
}
