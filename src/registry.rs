//! Static table registry: external table names to storage entity bindings,
//! plus the raw-SQL fallback allow-list. Resolution is a pure data lookup.

use std::collections::HashMap;

/// Resolved handle to a storage entity for an external table name.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ModelBinding {
    /// External name the binding was registered under.
    pub name: &'static str,
    /// Storage table the bound path queries.
    pub table: &'static str,
}

/// External name -> storage table. The API exposes pluralized snake_case
/// names; storage tables are singular. One row per logical table the
/// platform serves.
const BINDINGS: &[(&str, &str)] = &[
    // customer family
    ("customers", "customer"),
    ("customer_health_scores", "customer_health_score"),
    ("customer_notes", "customer_note"),
    // campaigns
    ("campaigns", "campaign"),
    ("campaign_messages", "campaign_message"),
    ("campaign_recipients", "campaign_recipient"),
    // messaging channels
    ("messaging_channels", "messaging_channel"),
    ("channel_numbers", "channel_number"),
    ("inbound_messages", "inbound_message"),
    // cart / orders
    ("cart_items", "cart_item"),
    ("orders", "order"),
    ("order_items", "order_item"),
    // billing
    ("billing_groups", "billing_group"),
    ("invoices", "invoice"),
    ("subscriptions", "subscription"),
    ("usage_records", "usage_record"),
];

/// Tables created after the last binding refresh: no entity binding exists,
/// so select/insert are served through hand-built SQL. Kept short so the raw
/// path stays auditable.
const FALLBACK_TABLES: &[&str] = &[
    "products",
    "product_categories",
    "marketplace_vendors",
    "vendor_payouts",
];

pub struct TableRegistry {
    by_name: HashMap<&'static str, ModelBinding>,
    by_table: HashMap<&'static str, ModelBinding>,
}

impl TableRegistry {
    pub fn new() -> Self {
        let mut by_name = HashMap::with_capacity(BINDINGS.len());
        let mut by_table = HashMap::with_capacity(BINDINGS.len());
        for &(name, table) in BINDINGS {
            let binding = ModelBinding { name, table };
            by_name.insert(name, binding);
            by_table.insert(table, binding);
        }
        TableRegistry { by_name, by_table }
    }

    /// Resolve an external table name to its binding. When the name is not
    /// registered, identity mapping is tried (the caller passed a storage
    /// table name directly) before the binding is declared absent.
    pub fn resolve(&self, table: &str) -> Option<ModelBinding> {
        self.by_name
            .get(table)
            .or_else(|| self.by_table.get(table))
            .copied()
    }

    /// Canonical static name for an allow-listed fallback table. Returning
    /// the static str keeps caller-owned strings out of raw SQL text.
    pub fn fallback_table(&self, table: &str) -> Option<&'static str> {
        FALLBACK_TABLES.iter().copied().find(|t| *t == table)
    }
}

impl Default for TableRegistry {
    fn default() -> Self {
        Self::new()
    }
}
