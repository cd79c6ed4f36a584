//! Integration tests for the conversion pipeline
//!
//! Runs whole files through the converter with NBP tables served by a
//! canned fetcher instead of the network.

use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use transactions2pln::prelude::*;
use transactions2pln::pipeline::{input_reader, read_rows};

const NBP_TABLE_A: &str = "data;1THB;1USD;1EUR;1CHF;nr tabeli;pełny numer tabeli\r\n\
    kod ISO;THB;USD;EUR;CHF\r\n\
    nazwa waluty;bat (Tajlandia);dolar amerykański;euro;frank szwajcarski\r\n\
    liczba jednostek;1;1;1;1\r\n\
    20230428;0,1225;4,1753;4,5889;4,6619;82;082/A/NBP/2023\r\n\
    20230502;0,1220;4,1823;4,6049;4,6810;83;083/A/NBP/2023\r\n\
    20230504;0,1217;4,1560;4,5930;4,6712;85;085/A/NBP/2023\r\n\
    \r\n\
    Źródło: Narodowy Bank Polski\r\n";

const NBP_TABLE_B: &str = "data;1AED;1AFN;nr tabeli\r\n\
    kod ISO;AED;AFN\r\n\
    20230426;1,1390;0,0487;017/B/NBP/2023\r\n";

/// Serves canned tables and records requested URLs
#[derive(Debug, Default)]
struct CannedFetcher {
    calls: AtomicUsize,
    urls: Mutex<Vec<String>>,
}

impl TableFetcher for CannedFetcher {
    fn fetch(&self, url: &str, destination: &Path) -> Result<u64> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.urls.lock().unwrap().push(url.to_string());
        let body = if url.contains("archiwum_tab_a_") {
            NBP_TABLE_A
        } else {
            NBP_TABLE_B
        };
        let (bytes, _, _) = encoding_rs::WINDOWS_1250.encode(body);
        fs::write(destination, &bytes)?;
        Ok(bytes.len() as u64)
    }
}

#[derive(Debug)]
struct Run {
    output: String,
    summary: ConversionSummary,
    fetcher: Arc<CannedFetcher>,
}

fn convert(input: &str, options: ConversionOptions, json: bool) -> Result<Run> {
    let scratch = TempDir::new().unwrap();
    let fetcher = Arc::new(CannedFetcher::default());
    let rows = read_rows(input_reader(input.as_bytes()));
    let converter = Converter::new(options).with_source_name("transactions.csv");

    let (summary, bytes) = if json {
        let mut sink = JsonArraySink::new(Vec::new());
        let summary = converter.run_with_nbp(rows, &mut sink, fetcher.clone(), scratch.path(), None)?;
        (summary, sink.into_inner())
    } else {
        let mut sink = DelimitedSink::new(Vec::new());
        let summary = converter.run_with_nbp(rows, &mut sink, fetcher.clone(), scratch.path(), None)?;
        (summary, sink.into_inner()?)
    };

    Ok(Run {
        output: String::from_utf8(bytes).unwrap(),
        summary,
        fetcher,
    })
}

fn slash_dates() -> ConversionOptions {
    ConversionOptions {
        date_format: "%Y/%m/%d".to_string(),
        labels: false,
        ..Default::default()
    }
}

#[test]
fn test_known_row_is_converted() {
    let input = "1,Acme,ACM,2023/05/02,USD,4356.12\n";
    let run = convert(input, slash_dates(), false).unwrap();

    assert_eq!(
        run.output,
        "1,Acme,ACM,2023/05/02,USD,4356.12,\"4,1823\",\"18218,60\"\n"
    );
    assert_eq!(run.summary.rows, 1);
    assert_eq!(run.summary.year, Some(2023));
    assert_eq!(run.summary.tables_fetched, 1);
}

#[test]
fn test_table_downloaded_once_per_group() {
    let input = "2023/05/02,USD,1\n\
                 2023/05/04,EUR,1\n\
                 2023/04/26,AED,1\n\
                 2023/04/28,CHF,1\n\
                 2023/04/27,AFN,100\n";
    let options = ConversionOptions {
        currency: "B".to_string(),
        ..slash_dates()
    };
    let run = convert(input, options, false).unwrap();

    assert_eq!(run.fetcher.calls.load(Ordering::SeqCst), 2);
    assert_eq!(
        *run.fetcher.urls.lock().unwrap(),
        vec![
            "https://static.nbp.pl/dane/kursy/Archiwum/archiwum_tab_a_2023.csv".to_string(),
            "https://static.nbp.pl/dane/kursy/Archiwum/archiwum_tab_b_2023.csv".to_string(),
        ]
    );
    let last = run.output.lines().last().unwrap();
    assert_eq!(last, "2023/04/27,AFN,100,\"0,0487\",\"4,87\"");
    assert_eq!(run.summary.tables_fetched, 2);
}

#[test]
fn test_saturday_transaction_uses_friday_table() {
    // 2023-04-29 is a Saturday
    let run = convert("2023/04/29,10\n", slash_dates(), false).unwrap();
    assert_eq!(run.output, "2023/04/29,10,\"4,1753\",\"41,75\"\n");
}

#[test]
fn test_holiday_falls_back_to_previous_table() {
    // 2023-05-03 is a public holiday, no table published
    let run = convert("2023/05/03,1\n", slash_dates(), false).unwrap();
    assert!(run.output.ends_with("\"4,1823\",\"4,18\"\n"), "{}", run.output);
}

#[test]
fn test_gap_longer_than_window_fails() {
    let err = convert("2023/05/10,1\n", slash_dates(), false).unwrap_err();
    match err {
        ConversionError::RowProcessing { row, cause } => {
            assert_eq!(row, 1);
            assert!(matches!(cause, RowFailure::RateLookup(ref msg) if msg.contains("2023-05-10")));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_labels_and_named_columns() {
    let input = "id,date,currency,amount,note\n\
                 1,02.05.2023,EUR,100,first\n\
                 2,04.05.2023,USD,-20.5,second\n";
    let options = ConversionOptions {
        currency: "currency".to_string(),
        amount_column: Some("amount".to_string()),
        date_column: Some("date".to_string()),
        ..Default::default()
    };
    let run = convert(input, options, false).unwrap();

    let lines: Vec<&str> = run.output.lines().collect();
    assert_eq!(
        lines,
        vec![
            "id,date,currency,amount,note,exchange rate to PLN,amount in PLN",
            "1,02.05.2023,EUR,100,first,\"4,6049\",\"460,49\"",
            "2,04.05.2023,USD,-20.5,second,\"4,1560\",\"-85,20\"",
        ]
    );
}

#[test]
fn test_json_output_is_valid_array() {
    let input = "date,amount\n2023/05/02,1\n2023/05/04,2\n";
    let options = ConversionOptions {
        labels: true,
        ..slash_dates()
    };
    let run = convert(input, options, true).unwrap();

    let value: serde_json::Value = serde_json::from_str(&run.output).unwrap();
    assert_eq!(
        value,
        serde_json::json!([
            {"date": "2023/05/02", "amount": "1", "exchange rate to PLN": "4,1823", "amount in PLN": "4,18"},
            {"date": "2023/05/04", "amount": "2", "exchange rate to PLN": "4,1560", "amount in PLN": "8,31"}
        ])
    );
}

#[test]
fn test_json_without_labels_writes_arrays() {
    let run = convert("2023/05/02,1\n", slash_dates(), true).unwrap();
    assert_eq!(run.output, r#"[["2023/05/02","1","4,1823","4,18"]]"#);
}

#[test]
fn test_empty_input() {
    let with_labels = ConversionOptions {
        labels: true,
        ..slash_dates()
    };
    let err = convert("", with_labels, false).unwrap_err();
    assert!(matches!(err, ConversionError::EmptyInput { ref source_name } if source_name == "transactions.csv"));
    assert_eq!(err.exit_code(), 3);

    let run = convert("", slash_dates(), true).unwrap();
    assert_eq!(run.output, "[]");
    assert_eq!(run.fetcher.calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_unknown_currency_fails_the_row() {
    let options = ConversionOptions {
        currency: "T2P".to_string(),
        ..slash_dates()
    };
    let err = convert("2023/05/02,1\n2023/05/02,1\n", options, false).unwrap_err();
    assert_eq!(err.exit_code(), 5);
    assert!(err.to_string().contains("T2P"));
}

#[test]
fn test_bad_column_option_aborts_before_rows() {
    let options = ConversionOptions {
        labels: true,
        amount_column: Some("kwota".to_string()),
        ..slash_dates()
    };
    let err = convert("date,amount\n2023/05/02,1\n", options, false).unwrap_err();
    assert!(matches!(err, ConversionError::ColumnParameter { .. }));
    assert_eq!(err.exit_code(), 4);
}

#[test]
fn test_point_separator_applies_to_output_only() {
    let options = ConversionOptions {
        number_format: NumberFormat {
            decimal_separator: '.',
        },
        ..slash_dates()
    };
    let run = convert("1,Acme,ACM,2023/05/02,USD,4356.12\n", options, false).unwrap();
    assert_eq!(
        run.output,
        "1,Acme,ACM,2023/05/02,USD,4356.12,4.1823,18218.60\n"
    );
}

#[test]
fn test_json_rejects_row_wider_than_header() {
    let input = "date,amount\n2023/05/02,1\n2023/05/04,2,note\n";
    let options = ConversionOptions {
        labels: true,
        amount_column: Some("amount".to_string()),
        ..slash_dates()
    };
    let err = convert(input, options, true).unwrap_err();

    match err {
        ConversionError::RowProcessing { row, cause } => {
            assert_eq!(row, 2);
            assert_eq!(cause, RowFailure::RowWidth { labels: 4, cells: 5 });
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_csv_passes_ragged_rows_through() {
    let input = "date,amount\n2023/05/02,1,note\n";
    let options = ConversionOptions {
        labels: true,
        amount_column: Some("amount".to_string()),
        ..slash_dates()
    };
    let run = convert(input, options, false).unwrap();
    assert_eq!(
        run.output.lines().last().unwrap(),
        "2023/05/02,1,note,\"4,1823\",\"4,18\""
    );
}

#[test]
fn test_empty_labelled_input_writes_no_json() {
    let scratch = TempDir::new().unwrap();
    let fetcher = Arc::new(CannedFetcher::default());
    let options = ConversionOptions {
        labels: true,
        ..slash_dates()
    };

    let mut sink = JsonArraySink::new(Vec::new());
    let err = Converter::new(options)
        .run_with_nbp(read_rows(input_reader("".as_bytes())), &mut sink, fetcher, scratch.path(), None)
        .unwrap_err();

    assert!(matches!(err, ConversionError::EmptyInput { .. }));
    assert!(sink.into_inner().is_empty());
}
