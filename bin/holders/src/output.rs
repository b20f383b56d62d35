//! Table and CSV rendering of a holder set.

use std::io::Write;
use std::path::Path;

use holder_set::{HolderBalance, HolderSet};

/// One rendered line: 1-based position, checksummed address, optional balance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HolderRow {
    pub position: usize,
    pub address: String,
    pub balance: Option<String>,
}

/// Build display rows. When `balances` is given, rows follow its order.
pub fn holder_rows(holders: &HolderSet, balances: Option<&[HolderBalance]>) -> Vec<HolderRow> {
    match balances {
        Some(balances) => balances
            .iter()
            .enumerate()
            .map(|(i, b)| HolderRow {
                position: i + 1,
                address: b.holder.to_string(),
                balance: Some(b.balance.to_string()),
            })
            .collect(),
        None => holders
            .iter()
            .enumerate()
            .map(|(i, holder)| HolderRow {
                position: i + 1,
                address: holder.to_string(),
                balance: None,
            })
            .collect(),
    }
}

fn headers(with_balance: bool) -> Vec<&'static str> {
    if with_balance {
        vec!["#", "Wallet Address", "Balance"]
    } else {
        vec!["#", "Wallet Address"]
    }
}

fn has_balance(rows: &[HolderRow]) -> bool {
    rows.iter().any(|r| r.balance.is_some())
}

/// Render rows as a left-aligned text table.
pub fn render_table(rows: &[HolderRow]) -> String {
    if rows.is_empty() {
        return "No holders found\n".to_string();
    }

    let with_balance = has_balance(rows);
    let position_width = rows.len().to_string().len().max(1);
    let address_width = rows
        .iter()
        .map(|r| r.address.len())
        .max()
        .unwrap_or(0)
        .max("Wallet Address".len());

    let header = headers(with_balance);
    let mut out = format_line(
        header[0],
        header[1],
        header.get(2).copied(),
        position_width,
        address_width,
    );
    for row in rows {
        out.push_str(&format_line(
            &row.position.to_string(),
            &row.address,
            row.balance.as_deref(),
            position_width,
            address_width,
        ));
    }
    out
}

fn format_line(
    position: &str,
    address: &str,
    balance: Option<&str>,
    position_width: usize,
    address_width: usize,
) -> String {
    match balance {
        Some(balance) => format!(
            "{:<pw$}  {:<aw$}  {}\n",
            position,
            address,
            balance,
            pw = position_width,
            aw = address_width
        ),
        None => format!("{:<pw$}  {}\n", position, address, pw = position_width),
    }
}

/// Write rows as CSV with a header row.
pub fn write_csv<W: Write>(writer: W, rows: &[HolderRow]) -> eyre::Result<()> {
    let with_balance = has_balance(rows);
    let mut writer = csv::Writer::from_writer(writer);

    writer.write_record(headers(with_balance))?;
    for row in rows {
        let position = row.position.to_string();
        let mut record = vec![position.as_str(), row.address.as_str()];
        if let Some(balance) = &row.balance {
            record.push(balance.as_str());
        }
        writer.write_record(&record)?;
    }

    writer.flush()?;
    Ok(())
}

pub fn write_csv_file(path: &Path, rows: &[HolderRow]) -> eyre::Result<()> {
    let file = std::fs::File::create(path)
        .map_err(|e| eyre::eyre!("Failed to create '{}': {}", path.display(), e))?;
    write_csv(file, rows)
}
