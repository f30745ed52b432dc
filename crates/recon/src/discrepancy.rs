use std::collections::BTreeMap;

use chrono::Duration;

use crate::matcher::pair_nearest;
use crate::model::{AmountDiscrepancy, TxnRecord};

/// Find same-account pairs whose amounts differ.
///
/// Pairs bank and sale records grouped by account alone (amount ignored)
/// under the same nearest-within-tolerance policy as the matcher, then keeps
/// pairs where a sale was found and the amounts differ. Equal-amount pairs
/// still consume their sale; they are filtered afterwards, not skipped
/// during pairing. This surfaces same-account deposits and sales booked at
/// different amounts, which key grouping by (account, amount) never sees.
pub fn find_amount_discrepancies(
    bank: &[TxnRecord],
    sales: &[TxnRecord],
    tolerance: Duration,
) -> Vec<AmountDiscrepancy> {
    let bank_groups = group_by_account(bank);
    let sales_groups = group_by_account(sales);

    let mut discrepancies = Vec::new();

    for (account, bank_group) in &bank_groups {
        let Some(sales_group) = sales_groups.get(account) else {
            continue;
        };
        for (bank_rec, sale) in pair_nearest(bank_group, sales_group, tolerance) {
            let Some(sale) = sale else {
                continue;
            };
            if bank_rec.amount_cents != sale.amount_cents {
                discrepancies.push(AmountDiscrepancy {
                    bank: bank_rec.clone(),
                    sale: sale.clone(),
                    difference_cents: bank_rec.amount_cents - sale.amount_cents,
                });
            }
        }
    }

    discrepancies.sort_by(|a, b| {
        a.bank
            .posted_at
            .cmp(&b.bank.posted_at)
            .then_with(|| a.bank.account_id.cmp(&b.bank.account_id))
    });

    discrepancies
}

/// Group records by account, each group sorted by timestamp ascending.
fn group_by_account(records: &[TxnRecord]) -> BTreeMap<&str, Vec<&TxnRecord>> {
    let mut groups: BTreeMap<&str, Vec<&TxnRecord>> = BTreeMap::new();
    for rec in records {
        groups.entry(rec.account_id.as_str()).or_default().push(rec);
    }
    for group in groups.values_mut() {
        group.sort_by_key(|r| r.posted_at);
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Source;
    use chrono::NaiveDateTime;
    use std::collections::HashMap;

    fn rec(source: Source, account: &str, cents: i64, ts: &str) -> TxnRecord {
        TxnRecord {
            source,
            account_id: account.into(),
            amount_cents: cents,
            posted_at: NaiveDateTime::parse_from_str(ts, "%Y-%m-%d %H:%M:%S").unwrap(),
            raw_fields: HashMap::new(),
        }
    }

    fn bank(account: &str, cents: i64, ts: &str) -> TxnRecord {
        rec(Source::Bank, account, cents, ts)
    }

    fn sale(account: &str, cents: i64, ts: &str) -> TxnRecord {
        rec(Source::Sale, account, cents, ts)
    }

    #[test]
    fn differing_amounts_reported() {
        let b = vec![bank("A", 10000, "2024-01-01 10:00:00")];
        let s = vec![sale("A", 9500, "2024-01-01 10:30:00")];
        let out = find_amount_discrepancies(&b, &s, Duration::hours(24));
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].difference_cents, 500);
        assert_eq!(out[0].bank.amount_cents, 10000);
        assert_eq!(out[0].sale.amount_cents, 9500);
    }

    #[test]
    fn equal_amounts_never_reported() {
        let b = vec![bank("A", 10000, "2024-01-01 10:00:00")];
        let s = vec![sale("A", 10000, "2024-01-01 10:30:00")];
        let out = find_amount_discrepancies(&b, &s, Duration::hours(24));
        assert!(out.is_empty());
    }

    #[test]
    fn equal_amount_pair_still_consumes_its_sale() {
        // The 10:05 sale is taken by the 10:00 deposit (equal amounts,
        // filtered), so the 10:10 deposit has nothing left to pair with.
        let b = vec![
            bank("A", 10000, "2024-01-01 10:00:00"),
            bank("A", 12000, "2024-01-01 10:10:00"),
        ];
        let s = vec![sale("A", 10000, "2024-01-01 10:05:00")];
        let out = find_amount_discrepancies(&b, &s, Duration::hours(24));
        assert!(out.is_empty());
    }

    #[test]
    fn out_of_tolerance_sale_is_no_pair() {
        let b = vec![bank("A", 10000, "2024-01-01 00:00:00")];
        let s = vec![sale("A", 9500, "2024-01-05 00:00:00")];
        let out = find_amount_discrepancies(&b, &s, Duration::hours(24));
        assert!(out.is_empty());
    }

    #[test]
    fn accounts_never_cross() {
        let b = vec![bank("A", 10000, "2024-01-01 10:00:00")];
        let s = vec![sale("B", 9500, "2024-01-01 10:00:00")];
        let out = find_amount_discrepancies(&b, &s, Duration::hours(24));
        assert!(out.is_empty());
    }

    #[test]
    fn output_ordered_by_bank_timestamp() {
        let b = vec![
            bank("B", 10000, "2024-01-02 10:00:00"),
            bank("A", 10000, "2024-01-01 10:00:00"),
        ];
        let s = vec![
            sale("B", 9000, "2024-01-02 10:00:00"),
            sale("A", 9000, "2024-01-01 10:00:00"),
        ];
        let out = find_amount_discrepancies(&b, &s, Duration::hours(24));
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].bank.account_id, "A");
        assert_eq!(out[1].bank.account_id, "B");
    }
}
