//! Quotation/invoice line items.
//!
//! Items form a two-level structure: top-level items, each optionally owning
//! sub-items. Sub-items cannot own sub-items, so the depth cap is a property of
//! the types rather than a convention. The flat `LineItemRow` form (with a
//! `parent_serial_no` back-reference) exists only at the persistence boundary.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use evbill_core::{DomainError, DomainResult, ValueObject, round2};

use crate::totals::{DocumentTotals, aggregate};

/// Line amount: `round2(quantity * rate)`.
///
/// Inputs are assumed validated (finite, non-negative) by the caller.
pub fn compute_amount(quantity: Decimal, rate: Decimal) -> Decimal {
    round2(quantity * rate)
}

/// A single billable line. Its amount is always derived.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub description: String,
    pub size: Option<String>,
    pub quantity: Decimal,
    pub rate: Decimal,
}

impl ValueObject for LineItem {}

impl LineItem {
    pub fn new(description: impl Into<String>, quantity: Decimal, rate: Decimal) -> Self {
        Self {
            description: description.into(),
            size: None,
            quantity,
            rate,
        }
    }

    pub fn with_size(mut self, size: impl Into<String>) -> Self {
        self.size = Some(size.into());
        self
    }

    pub fn amount(&self) -> Decimal {
        compute_amount(self.quantity, self.rate)
    }
}

/// A top-level item and the sub-items listed under it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItemGroup {
    pub item: LineItem,
    pub sub_items: Vec<LineItem>,
}

impl LineItemGroup {
    pub fn new(item: LineItem) -> Self {
        Self {
            item,
            sub_items: Vec::new(),
        }
    }
}

/// A line item with its display numbering resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NumberedLineItem {
    /// 1-based position among top-level items, or among siblings for a sub-item.
    pub serial_no: u32,
    /// `"3"` for a top-level item, `"3.1"` for its first sub-item.
    pub label: String,
    pub parent_serial_no: Option<u32>,
    pub item: LineItem,
    pub amount: Decimal,
}

impl NumberedLineItem {
    pub fn is_sub_item(&self) -> bool {
        self.parent_serial_no.is_some()
    }
}

/// Persisted child row of a quotation or invoice.
///
/// Rows are deleted and fully re-inserted on every document save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItemRow {
    pub serial_no: u32,
    pub description: String,
    pub size: Option<String>,
    pub quantity: Decimal,
    pub rate: Decimal,
    pub amount: Decimal,
    pub is_sub_item: bool,
    pub parent_serial_no: Option<u32>,
}

/// The ordered items of one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItems {
    groups: Vec<LineItemGroup>,
}

impl LineItems {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn groups(&self) -> &[LineItemGroup] {
        &self.groups
    }

    /// Number of top-level items.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Append a top-level item; returns its serial number.
    pub fn push_item(&mut self, item: LineItem) -> u32 {
        self.groups.push(LineItemGroup::new(item));
        self.groups.len() as u32
    }

    /// Append a sub-item under the top-level item `parent_serial_no`.
    ///
    /// Returns the sub-item's display label (e.g. `"3.2"`).
    pub fn push_sub_item(&mut self, parent_serial_no: u32, item: LineItem) -> DomainResult<String> {
        let group = self.group_mut(parent_serial_no)?;
        group.sub_items.push(item);
        Ok(format!("{parent_serial_no}.{}", group.sub_items.len()))
    }

    /// Remove a top-level item together with its sub-items.
    ///
    /// Later items shift down one serial number.
    pub fn remove_item(&mut self, serial_no: u32) -> DomainResult<LineItemGroup> {
        let idx = self.index_of(serial_no)?;
        Ok(self.groups.remove(idx))
    }

    /// Remove the `position`-th (1-based) sub-item of `parent_serial_no`.
    pub fn remove_sub_item(&mut self, parent_serial_no: u32, position: u32) -> DomainResult<LineItem> {
        let group = self.group_mut(parent_serial_no)?;
        let idx = (position as usize)
            .checked_sub(1)
            .filter(|idx| *idx < group.sub_items.len())
            .ok_or_else(|| {
                DomainError::not_found(format!("sub-item {parent_serial_no}.{position}"))
            })?;
        Ok(group.sub_items.remove(idx))
    }

    /// Amounts of every item and sub-item, in display order.
    pub fn amounts(&self) -> impl Iterator<Item = Decimal> + '_ {
        self.groups.iter().flat_map(|group| {
            core::iter::once(group.item.amount()).chain(group.sub_items.iter().map(LineItem::amount))
        })
    }

    pub fn totals(&self) -> DocumentTotals {
        aggregate(self)
    }

    /// Display numbering: top-level items are numbered 1..n in order, sub-items
    /// are labelled under their parent and do not consume a top-level serial.
    pub fn renumber(&self) -> Vec<NumberedLineItem> {
        let mut out = Vec::with_capacity(self.groups.len());
        for (idx, group) in self.groups.iter().enumerate() {
            let serial_no = idx as u32 + 1;
            out.push(NumberedLineItem {
                serial_no,
                label: serial_no.to_string(),
                parent_serial_no: None,
                amount: group.item.amount(),
                item: group.item.clone(),
            });
            for (sub_idx, sub) in group.sub_items.iter().enumerate() {
                let sub_serial = sub_idx as u32 + 1;
                out.push(NumberedLineItem {
                    serial_no: sub_serial,
                    label: format!("{serial_no}.{sub_serial}"),
                    parent_serial_no: Some(serial_no),
                    amount: sub.amount(),
                    item: sub.clone(),
                });
            }
        }
        out
    }

    /// Flatten into persistence rows, amounts recomputed.
    pub fn to_rows(&self) -> Vec<LineItemRow> {
        self.renumber()
            .into_iter()
            .map(|numbered| LineItemRow {
                is_sub_item: numbered.is_sub_item(),
                serial_no: numbered.serial_no,
                parent_serial_no: numbered.parent_serial_no,
                amount: numbered.amount,
                description: numbered.item.description,
                size: numbered.item.size,
                quantity: numbered.item.quantity,
                rate: numbered.item.rate,
            })
            .collect()
    }

    /// Rebuild the two-level structure from persisted rows.
    ///
    /// Top-level rows keep their stored relative order and are renumbered
    /// 1..n. A sub-item must reference the stored serial of a top-level row;
    /// dangling references and sub-items of sub-items are rejected. Stored
    /// amounts are ignored and recomputed.
    pub fn from_rows(rows: &[LineItemRow]) -> DomainResult<Self> {
        let mut groups = Vec::new();
        let mut by_serial: HashMap<u32, usize> = HashMap::new();

        for row in rows.iter().filter(|r| !r.is_sub_item) {
            if by_serial.insert(row.serial_no, groups.len()).is_some() {
                return Err(DomainError::validation(format!(
                    "duplicate top-level serial number {}",
                    row.serial_no
                )));
            }
            groups.push(LineItemGroup::new(row_item(row)));
        }

        for row in rows.iter().filter(|r| r.is_sub_item) {
            let parent = row.parent_serial_no.ok_or_else(|| {
                DomainError::validation(format!("sub-item '{}' has no parent serial number", row.description))
            })?;
            let idx = by_serial.get(&parent).copied().ok_or_else(|| {
                DomainError::validation(format!(
                    "sub-item '{}' must reference an existing top-level item (parent {parent})",
                    row.description
                ))
            })?;
            groups[idx].sub_items.push(row_item(row));
        }

        Ok(Self { groups })
    }

    fn index_of(&self, serial_no: u32) -> DomainResult<usize> {
        (serial_no as usize)
            .checked_sub(1)
            .filter(|idx| *idx < self.groups.len())
            .ok_or_else(|| DomainError::not_found(format!("line item {serial_no}")))
    }

    fn group_mut(&mut self, serial_no: u32) -> DomainResult<&mut LineItemGroup> {
        let idx = self.index_of(serial_no)?;
        Ok(&mut self.groups[idx])
    }
}

fn row_item(row: &LineItemRow) -> LineItem {
    LineItem {
        description: row.description.clone(),
        size: row.size.clone(),
        quantity: row.quantity,
        rate: row.rate,
    }
}
