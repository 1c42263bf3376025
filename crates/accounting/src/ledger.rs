use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use evbill_core::{ClientId, InvoiceId};
use evbill_invoicing::{Invoice, Payment};

/// Whether a ledger line comes from an invoice (debit) or a payment (credit).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerEntryKind {
    Invoice,
    Payment,
}

/// One line of a client statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LedgerEntry {
    pub date: NaiveDate,
    pub kind: LedgerEntryKind,
    pub reference_label: String,
    pub debit: Decimal,
    pub credit: Decimal,
    /// Running balance after this entry.
    pub balance: Decimal,
}

/// Statement of account for one client over a date window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ledger {
    pub client_id: ClientId,
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
    pub entries: Vec<LedgerEntry>,
    pub total_debit: Decimal,
    pub total_credit: Decimal,
    pub closing_balance: Decimal,
}

impl Ledger {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Build a client's ledger from an invoice/payment snapshot.
///
/// - invoices of `client_id` dated within `[from_date, to_date]` become debits
///   of their total amount;
/// - payments dated within the window whose invoice (looked up in `invoices`,
///   regardless of the invoice's own date) belongs to `client_id` become credits;
/// - entries are ordered by date; same-date entries keep input order, invoices
///   before payments.
///
/// Pure: identical inputs always produce an identical ledger.
pub fn build_ledger(
    client_id: ClientId,
    from_date: NaiveDate,
    to_date: NaiveDate,
    invoices: &[Invoice],
    payments: &[Payment],
) -> Ledger {
    let in_window = |date: NaiveDate| date >= from_date && date <= to_date;

    let client_invoices: HashMap<InvoiceId, &Invoice> = invoices
        .iter()
        .filter(|inv| inv.client_id() == client_id)
        .map(|inv| (inv.id(), inv))
        .collect();

    let mut entries: Vec<LedgerEntry> = invoices
        .iter()
        .filter(|inv| inv.client_id() == client_id && in_window(inv.invoice_date()))
        .map(|inv| LedgerEntry {
            date: inv.invoice_date(),
            kind: LedgerEntryKind::Invoice,
            reference_label: inv.invoice_number().to_string(),
            debit: inv.total_amount(),
            credit: Decimal::ZERO,
            balance: Decimal::ZERO,
        })
        .collect();

    entries.extend(payments.iter().filter(|p| in_window(p.payment_date())).filter_map(|p| {
        let invoice = client_invoices.get(&p.invoice_id())?;
        Some(LedgerEntry {
            date: p.payment_date(),
            kind: LedgerEntryKind::Payment,
            reference_label: payment_label(p, invoice),
            debit: Decimal::ZERO,
            credit: p.amount(),
            balance: Decimal::ZERO,
        })
    }));

    // Stable: same-date entries keep their relative order.
    entries.sort_by_key(|e| e.date);

    let mut running = Decimal::ZERO;
    let mut total_debit = Decimal::ZERO;
    let mut total_credit = Decimal::ZERO;
    for entry in &mut entries {
        running += entry.debit - entry.credit;
        total_debit += entry.debit;
        total_credit += entry.credit;
        entry.balance = running;
    }

    Ledger {
        client_id,
        from_date,
        to_date,
        entries,
        total_debit,
        total_credit,
        closing_balance: running,
    }
}

fn payment_label(payment: &Payment, invoice: &Invoice) -> String {
    match payment.reference_number() {
        Some(reference) => format!("Payment - {} ({reference})", invoice.invoice_number()),
        None => format!("Payment - {}", invoice.invoice_number()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use evbill_core::{PaymentId, Region};
    use evbill_invoicing::{DocumentNumber, LineItem, LineItems, NewPayment, PaymentMode};
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 7, d).unwrap()
    }

    fn invoice(client_id: ClientId, serial: u64, date: NaiveDate, net: Decimal) -> Invoice {
        let mut items = LineItems::new();
        items.push_item(LineItem::new("Event services", dec!(1), net));
        Invoice::new(
            InvoiceId::new(),
            DocumentNumber::format("INV-UAE-", serial, 4),
            client_id,
            Region::Uae,
            date,
            &items,
        )
    }

    fn payment(invoice: &Invoice, date: NaiveDate, amount: Decimal, reference: Option<&str>) -> Payment {
        Payment::new(
            PaymentId::new(),
            NewPayment {
                invoice_id: invoice.id(),
                amount,
                payment_date: date,
                payment_mode: PaymentMode::Cheque,
                reference_number: reference.map(str::to_string),
            },
        )
        .unwrap()
    }

    #[test]
    fn invoice_then_full_payment_closes_at_zero() {
        let client = ClientId::new();
        // net 952.38 -> total 1000.00
        let inv = invoice(client, 1, day(1), dec!(952.38));
        let pay = payment(&inv, day(2), dec!(1000), None);

        let ledger = build_ledger(client, day(1), day(31), &[inv], &[pay]);

        assert_eq!(ledger.entries.len(), 2);
        assert_eq!(ledger.entries[0].kind, LedgerEntryKind::Invoice);
        assert_eq!(ledger.entries[0].debit, dec!(1000));
        assert_eq!(ledger.entries[0].date, day(1));
        assert_eq!(ledger.entries[0].balance, dec!(1000));
        assert_eq!(ledger.entries[1].kind, LedgerEntryKind::Payment);
        assert_eq!(ledger.entries[1].credit, dec!(1000));
        assert_eq!(ledger.entries[1].date, day(2));
        assert_eq!(ledger.closing_balance, dec!(0));
        assert_eq!(ledger.total_debit, dec!(1000));
        assert_eq!(ledger.total_credit, dec!(1000));
    }

    #[test]
    fn empty_window_yields_empty_ledger() {
        let client = ClientId::new();
        let inv = invoice(client, 1, day(10), dec!(100));
        let ledger = build_ledger(client, day(1), day(5), &[inv], &[]);
        assert!(ledger.is_empty());
        assert_eq!(ledger.closing_balance, Decimal::ZERO);

        let nothing = build_ledger(client, day(1), day(31), &[], &[]);
        assert!(nothing.is_empty());
        assert_eq!(nothing.closing_balance, Decimal::ZERO);
    }

    #[test]
    fn other_clients_and_out_of_window_rows_are_excluded() {
        let client = ClientId::new();
        let other = ClientId::new();
        let early = invoice(client, 1, day(1), dec!(100));
        let mine = invoice(client, 2, day(10), dec!(200));
        let theirs = invoice(other, 3, day(10), dec!(300));

        let payments = vec![
            // in window, invoice dated before the window: still the client's payment
            payment(&early, day(12), dec!(50), Some("CHQ-1")),
            payment(&theirs, day(12), dec!(315), None),
            payment(&mine, day(25), dec!(10), None),
        ];

        let ledger = build_ledger(client, day(5), day(20), &[early, mine, theirs], &payments);
        let labels: Vec<_> = ledger.entries.iter().map(|e| e.reference_label.as_str()).collect();
        assert_eq!(labels, vec!["INV-UAE-0002", "Payment - INV-UAE-0001 (CHQ-1)"]);
        assert_eq!(ledger.closing_balance, dec!(160));
    }

    #[test]
    fn same_day_entries_keep_invoice_then_payment_order() {
        let client = ClientId::new();
        let a = invoice(client, 1, day(3), dec!(100));
        let b = invoice(client, 2, day(3), dec!(100));
        let pay_b = payment(&b, day(3), dec!(5), None);
        let pay_a = payment(&a, day(3), dec!(7), None);

        let ledger = build_ledger(client, day(1), day(31), &[a, b], &[pay_b, pay_a]);
        let labels: Vec<_> = ledger.entries.iter().map(|e| e.reference_label.as_str()).collect();
        assert_eq!(
            labels,
            vec![
                "INV-UAE-0001",
                "INV-UAE-0002",
                "Payment - INV-UAE-0002",
                "Payment - INV-UAE-0001"
            ]
        );
        let balances: Vec<_> = ledger.entries.iter().map(|e| e.balance).collect();
        assert_eq!(balances, vec![dec!(105), dec!(210), dec!(205), dec!(198)]);
    }

    #[test]
    fn window_bounds_are_inclusive() {
        let client = ClientId::new();
        let first = invoice(client, 1, day(1), dec!(10));
        let last = invoice(client, 2, day(31), dec!(10));
        let ledger = build_ledger(client, day(1), day(31), &[first, last], &[]);
        assert_eq!(ledger.entries.len(), 2);
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 64,
            ..ProptestConfig::default()
        })]

        /// Property: identical inputs produce byte-identical statements, and
        /// the closing balance equals debits minus credits.
        #[test]
        fn ledger_is_deterministic(
            rows in prop::collection::vec((1u32..29, 1i64..100_000i64, prop::option::of((1u32..29, 1i64..50_000i64))), 0..20)
        ) {
            let client = ClientId::new();
            let mut invoices = Vec::new();
            let mut payments = Vec::new();
            for (idx, (inv_day, net_cents, pay)) in rows.into_iter().enumerate() {
                let inv = invoice(client, idx as u64 + 1, day(inv_day), Decimal::new(net_cents, 2));
                if let Some((pay_day, cents)) = pay {
                    payments.push(payment(&inv, day(pay_day), Decimal::new(cents, 2), None));
                }
                invoices.push(inv);
            }

            let first = build_ledger(client, day(1), day(31), &invoices, &payments);
            let second = build_ledger(client, day(1), day(31), &invoices, &payments);

            let first_json = serde_json::to_vec(&first).unwrap();
            let second_json = serde_json::to_vec(&second).unwrap();
            prop_assert_eq!(first_json, second_json);

            prop_assert_eq!(first.closing_balance, first.total_debit - first.total_credit);
            prop_assert!(first.entries.windows(2).all(|w| w[0].date <= w[1].date));
            prop_assert_eq!(first.entries.len(), invoices.len() + payments.len());
        }
    }
}
