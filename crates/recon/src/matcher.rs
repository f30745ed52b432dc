use std::collections::{BTreeMap, BTreeSet};

use chrono::Duration;

use crate::model::{MatchKey, MatchOutput, MatchedPair, TxnRecord};

/// Match bank deposits to sales by exact (account, amount) key and nearest
/// timestamp within the tolerance window.
///
/// A pair where account, amount, and timestamp are all identical is just the
/// zero-offset case of nearest pairing, so there is no separate exact pass.
/// Residual sets are key-membership based: one qualifying pairing covers
/// every record carrying that key, on both sides.
pub fn match_by_key(bank: &[TxnRecord], sales: &[TxnRecord], tolerance: Duration) -> MatchOutput {
    let bank_groups = group_by_key(bank);
    let sales_groups = group_by_key(sales);

    let mut matched = Vec::new();
    let mut matched_keys: BTreeSet<MatchKey> = BTreeSet::new();

    for (key, bank_group) in &bank_groups {
        let Some(sales_group) = sales_groups.get(key) else {
            continue;
        };
        for (bank_rec, sale) in pair_nearest(bank_group, sales_group, tolerance) {
            if let Some(sale) = sale {
                matched.push(MatchedPair {
                    bank: bank_rec.clone(),
                    sale: sale.clone(),
                    offset_seconds: (bank_rec.posted_at - sale.posted_at).num_seconds(),
                });
                matched_keys.insert(key.clone());
            }
        }
    }

    matched.sort_by(|a, b| {
        a.bank
            .posted_at
            .cmp(&b.bank.posted_at)
            .then_with(|| a.bank.account_id.cmp(&b.bank.account_id))
            .then_with(|| a.bank.amount_cents.cmp(&b.bank.amount_cents))
    });

    MatchOutput {
        matched,
        unmatched_sales: residuals(sales, &matched_keys),
        unmatched_deposits: residuals(bank, &matched_keys),
    }
}

/// Group records by MatchKey, each group sorted by timestamp ascending.
/// The sort is stable so input order breaks timestamp ties.
fn group_by_key(records: &[TxnRecord]) -> BTreeMap<MatchKey, Vec<&TxnRecord>> {
    let mut groups: BTreeMap<MatchKey, Vec<&TxnRecord>> = BTreeMap::new();
    for rec in records {
        groups.entry(rec.match_key()).or_default().push(rec);
    }
    for group in groups.values_mut() {
        group.sort_by_key(|r| r.posted_at);
    }
    groups
}

/// Records whose key never achieved a qualifying pairing, in input order.
fn residuals(records: &[TxnRecord], matched_keys: &BTreeSet<MatchKey>) -> Vec<TxnRecord> {
    records
        .iter()
        .filter(|r| !matched_keys.contains(&r.match_key()))
        .cloned()
        .collect()
}

/// Pair each left record with its nearest-in-time unconsumed right record.
///
/// Both slices must be sorted by timestamp ascending. For each left record
/// the insertion point is found by binary search, then the scan moves
/// outward to the nearest unconsumed candidate on either side. Equidistant
/// candidates resolve to the earlier one. A pairing is kept only when the
/// offset is within `tolerance` (inclusive); a kept pairing consumes the
/// right record, so each right record is used at most once.
pub(crate) fn pair_nearest<'a>(
    left: &[&'a TxnRecord],
    right: &[&'a TxnRecord],
    tolerance: Duration,
) -> Vec<(&'a TxnRecord, Option<&'a TxnRecord>)> {
    let tolerance_secs = tolerance.num_seconds();
    let mut consumed = vec![false; right.len()];
    let mut out = Vec::with_capacity(left.len());

    for l in left {
        let at = l.posted_at;
        // First right index with timestamp >= at.
        let split = right.partition_point(|r| r.posted_at < at);

        let below = (0..split)
            .rev()
            .find(|&i| !consumed[i])
            .map(|i| (i, (at - right[i].posted_at).num_seconds()));
        let above = (split..right.len())
            .find(|&i| !consumed[i])
            .map(|i| (i, (right[i].posted_at - at).num_seconds()));

        let nearest = match (below, above) {
            // The below candidate is the earlier one, so ties go to it.
            (Some((bi, bd)), Some((_, ad))) if bd <= ad => Some((bi, bd)),
            (Some(_), Some((ai, ad))) => Some((ai, ad)),
            (Some(b), None) => Some(b),
            (None, Some(a)) => Some(a),
            (None, None) => None,
        };

        match nearest {
            Some((i, dist)) if dist <= tolerance_secs => {
                consumed[i] = true;
                out.push((*l, Some(right[i])));
            }
            _ => out.push((*l, None)),
        }
    }

    out
}
