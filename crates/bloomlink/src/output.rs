use std::collections::BTreeMap;
use std::io::IsTerminal;

use bloomlink_proto::Record;
use bloomlink_transport::{BondedDevice, BtAddr};
use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

pub fn print_record(record: &Record, format: OutputFormat) {
    // Field order is meaningless on the wire; sort for stable output.
    let sorted: BTreeMap<&str, &str> = record.iter().collect();

    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string(record).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["FIELD", "VALUE"]);
            for (key, value) in &sorted {
                table.add_row(vec![key.to_string(), value.to_string()]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            let line: Vec<String> = sorted
                .iter()
                .map(|(key, value)| format!("{key}={value}"))
                .collect();
            println!("{}", line.join(" "));
        }
    }
}

#[derive(Serialize)]
struct DeviceOutput<'a> {
    name: &'a str,
    addr: String,
    selected: bool,
}

pub fn print_devices(devices: &[BondedDevice], selected: Option<BtAddr>, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            for device in devices {
                let out = DeviceOutput {
                    name: &device.name,
                    addr: device.addr.to_string(),
                    selected: selected == Some(device.addr),
                };
                println!(
                    "{}",
                    serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
                );
            }
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["NAME", "ADDRESS", "SELECTED"]);
            for device in devices {
                let mark = if selected == Some(device.addr) {
                    "*"
                } else {
                    ""
                };
                table.add_row(vec![
                    device.name.clone(),
                    device.addr.to_string(),
                    mark.to_string(),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            for device in devices {
                let mark = if selected == Some(device.addr) {
                    " [selected]"
                } else {
                    ""
                };
                println!("{} {}{mark}", device.addr, device.name);
            }
        }
    }
}
