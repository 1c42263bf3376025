//! End-to-end billing flow over the in-memory stores.
//!
//! Sequencer -> invoice -> payments -> statement, checking that the numbers
//! issued, the stored balances and the ledger all agree.

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use evbill_accounting::{LedgerEntryKind, build_ledger};
use evbill_core::{ClientId, InvoiceId, Region};
use evbill_invoicing::{Invoice, LineItem, LineItems, NewPayment, PaymentMode, PaymentState};

use crate::config::BillingConfig;
use crate::payments::{InMemoryPaymentStore, PaymentStore};
use crate::sequencer::{DocumentSequencer, InMemoryDocumentSequencer};

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 10, d).unwrap()
}

fn event_items() -> LineItems {
    let mut items = LineItems::new();
    let stage = items.push_item(LineItem::new("Stage setup", dec!(1), dec!(300)));
    items
        .push_sub_item(stage, LineItem::new("Lighting rig", dec!(2), dec!(15)).with_size("4x4"))
        .unwrap();
    items
}

async fn issue_invoice(
    sequencer: &dyn DocumentSequencer,
    store: &dyn PaymentStore,
    client_id: ClientId,
    region: Region,
    date: NaiveDate,
) -> Invoice {
    let number = sequencer.next_number(region).await.unwrap();
    let invoice = Invoice::new(InvoiceId::new(), number, client_id, region, date, &event_items());
    store.insert_invoice(&invoice).await.unwrap();
    invoice
}

fn payment(invoice: &Invoice, amount: Decimal, date: NaiveDate, reference: &str) -> NewPayment {
    NewPayment {
        invoice_id: invoice.id(),
        amount,
        payment_date: date,
        payment_mode: PaymentMode::BankTransfer,
        reference_number: Some(reference.to_string()),
    }
}

#[tokio::test]
async fn invoice_lifecycle_matches_client_statement() {
    evbill_observability::init_for_tests();

    let sequencer = InMemoryDocumentSequencer::from_config(&BillingConfig::default());
    let store = InMemoryPaymentStore::new();
    let client = ClientId::new();

    let first = issue_invoice(&sequencer, &store, client, Region::Uae, day(1)).await;
    let second = issue_invoice(&sequencer, &store, client, Region::Uae, day(5)).await;
    assert_eq!(first.invoice_number().as_str(), "INV-UAE-0001");
    assert_eq!(second.invoice_number().as_str(), "INV-UAE-0002");

    // 300 + 2 x 15 = 330 net, 16.50 VAT
    assert_eq!(first.total_amount(), dec!(346.50));

    store
        .record_payment(payment(&first, dec!(346.50), day(3), "TRX-100"))
        .await
        .unwrap();
    let (partial, _) = store
        .record_payment(payment(&second, dec!(100), day(6), "TRX-101"))
        .await
        .unwrap();
    let (mistaken, after_mistake) = store
        .record_payment(payment(&second, dec!(50), day(7), "TRX-102"))
        .await
        .unwrap();
    assert_eq!(after_mistake.balance(), dec!(196.50));

    let corrected = store.delete_payment(mistaken.id()).await.unwrap();
    assert_eq!(corrected.balance(), dec!(246.50));
    assert_eq!(corrected.payment_state(), PaymentState::PartiallyPaid);

    let invoices = store.invoices_for_client(client).await.unwrap();
    let payments = store.payments_for_client(client).await.unwrap();
    assert_eq!(payments.len(), 2);
    assert!(payments.iter().any(|p| p.id() == partial.id()));

    let ledger = build_ledger(client, day(1), day(31), &invoices, &payments);
    let kinds: Vec<_> = ledger.entries.iter().map(|e| e.kind).collect();
    assert_eq!(
        kinds,
        vec![
            LedgerEntryKind::Invoice,
            LedgerEntryKind::Payment,
            LedgerEntryKind::Invoice,
            LedgerEntryKind::Payment,
        ]
    );

    let outstanding: Decimal = invoices.iter().map(Invoice::balance).sum();
    assert_eq!(ledger.closing_balance, outstanding);
    assert_eq!(ledger.closing_balance, dec!(246.50));
    assert_eq!(ledger.entries[3].reference_label, "Payment - INV-UAE-0002 (TRX-101)");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_invoicing_never_reuses_a_number() {
    let sequencer = Arc::new(InMemoryDocumentSequencer::default());
    let store = Arc::new(InMemoryPaymentStore::new());
    let client = ClientId::new();

    let mut handles = Vec::new();
    for i in 0..20u32 {
        let sequencer = Arc::clone(&sequencer);
        let store = Arc::clone(&store);
        let region = if i % 2 == 0 { Region::Uae } else { Region::Saudi };
        handles.push(tokio::spawn(async move {
            issue_invoice(sequencer.as_ref(), store.as_ref(), client, region, day(1)).await
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let invoices = store.invoices_for_client(client).await.unwrap();
    assert_eq!(invoices.len(), 20);
    for region in Region::ALL {
        let mut suffixes: Vec<u64> = invoices
            .iter()
            .filter(|inv| inv.region() == region)
            .filter_map(|inv| inv.invoice_number().numeric_suffix())
            .collect();
        suffixes.sort_unstable();
        assert_eq!(suffixes, (1..=10).collect::<Vec<_>>());
    }
}
