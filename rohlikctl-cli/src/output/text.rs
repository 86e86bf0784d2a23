//! Text output formatting with colors.

use chrono::{DateTime, Duration, Local, Utc};

use rohlikctl_core::{
    AccountInfo, CartSummary, DeliveryInfo, DeliverySlot, Polled, PremiumStatus, ProductMatch,
    ShoppingList, Snapshot,
};

// ============================================================================
// ANSI Colors
// ============================================================================

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";
const CYAN: &str = "\x1b[36m";

/// Age after which a carried-forward value is flagged in the output.
const STALE_AFTER_MINUTES: i64 = 30;

/// Text formatter with optional colors.
pub struct TextFormatter {
    use_colors: bool,
}

impl TextFormatter {
    /// Creates a new text formatter.
    pub fn new(use_colors: bool) -> Self {
        Self { use_colors }
    }

    // ------------------------------------------------------------------
    // Snapshot
    // ------------------------------------------------------------------

    /// Formats a full status snapshot.
    pub fn format_snapshot(&self, snapshot: &Snapshot) -> String {
        let mut lines = Vec::new();

        if snapshot.needs_reconfiguration {
            lines.push(self.red("! Repeated authentication failures; check credentials"));
        }
        if snapshot.partial {
            lines.push(self.yellow("! Partial data; some fields show an older value"));
        }
        if snapshot.needs_reconfiguration || snapshot.partial {
            lines.push(String::new());
        }

        match &snapshot.account {
            Some(account) => {
                lines.push(self.format_account(account));
                lines.push(String::new());
            }
            None => lines.push(format!("{}\n", self.dim("Account: no data yet"))),
        }

        if let Some(premium) = &snapshot.premium {
            lines.push(self.format_premium(premium));
            lines.push(String::new());
        }

        match &snapshot.delivery {
            Some(delivery) => {
                lines.push(self.format_delivery(delivery));
                lines.push(String::new());
            }
            None => lines.push(format!("{}\n", self.dim("Delivery: no data yet"))),
        }

        match &snapshot.cart {
            Some(cart) => lines.push(self.format_polled_cart(cart)),
            None => lines.push(self.dim("Cart: no data yet")),
        }

        if let Some(completed_at) = snapshot.completed_at {
            lines.push(String::new());
            lines.push(self.dim(&format!("Refreshed {}", format_local(completed_at))));
        }

        lines.join("\n")
    }

    fn format_account(&self, account: &Polled<AccountInfo>) -> String {
        let info = &account.value;
        let mut lines = vec![format!(
            "{} {}{}",
            self.bold(&info.name),
            self.dim(&format!("<{}>", info.email)),
            self.stale_marker(account)
        )];
        lines.push(format!("Credit:  {:.2}", info.credit_amount));
        if let Some(bags) = info.bags_count {
            lines.push(format!("Bags:    {bags}"));
        }
        lines.join("\n")
    }

    fn format_premium(&self, premium: &Polled<PremiumStatus>) -> String {
        let status = &premium.value;
        if !status.active {
            return format!("Premium: {}", self.dim("inactive"));
        }

        let plan = status.plan.as_deref().unwrap_or("active");
        let mut line = format!("Premium: {}", self.green(plan));
        if let Some(days) = status.days_remaining {
            line.push_str(&format!(" ({days} days left)"));
        }
        if let Some(express) = status.free_express_orders {
            line.push_str(&format!(", {express} free express deliveries"));
        }
        line
    }

    fn format_delivery(&self, delivery: &Polled<DeliveryInfo>) -> String {
        let info = &delivery.value;
        if info.is_empty() {
            return format!("Delivery: {}", self.dim("no information"));
        }

        let marker = self.stale_marker(delivery);
        let mut lines = Vec::new();

        match &info.first_slot {
            Some(slot) => lines.push(format!(
                "Next delivery:  {}{marker}",
                self.cyan(&format_slot(slot))
            )),
            None => lines.push(format!("Next delivery:  {}{marker}", self.dim("none available"))),
        }
        if let Some(slot) = &info.reserved_slot {
            lines.push(format!("Reserved slot:  {}", self.green(&format_slot(slot))));
        }
        if let Some(announcement) = &info.announcement {
            lines.push(format!("Announcement:   {announcement}"));
        }

        lines.join("\n")
    }

    fn format_polled_cart(&self, cart: &Polled<CartSummary>) -> String {
        let summary = &cart.value;
        let marker = self.stale_marker(cart);
        if summary.items.is_empty() {
            return format!("Cart: {}{marker}", self.dim("empty"));
        }
        format!(
            "Cart: {} items, total {:.2}{}{marker}",
            summary.total_items,
            summary.total_price,
            if summary.can_make_order {
                String::new()
            } else {
                format!(" {}", self.yellow("(below order minimum)"))
            }
        )
    }

    // ------------------------------------------------------------------
    // Cart
    // ------------------------------------------------------------------

    /// Formats full cart contents.
    pub fn format_cart(&self, cart: &CartSummary) -> String {
        if cart.items.is_empty() {
            return self.dim("Cart is empty");
        }

        let mut lines = Vec::new();
        for item in &cart.items {
            lines.push(format!(
                "{:>3}x {}  {:.2}  {}",
                item.quantity,
                self.bold(&item.name),
                item.price,
                self.dim(&format!("[{}]", item.cart_item_id)),
            ));
        }
        lines.push(String::new());
        lines.push(format!(
            "Total: {} ({} items){}",
            self.bold(&format!("{:.2}", cart.total_price)),
            cart.total_items,
            if cart.can_make_order {
                String::new()
            } else {
                format!(" {}", self.yellow("below order minimum"))
            }
        ));
        lines.join("\n")
    }

    // ------------------------------------------------------------------
    // Search & lists
    // ------------------------------------------------------------------

    /// Formats product search results, one per line.
    pub fn format_matches(&self, matches: &[ProductMatch]) -> String {
        let mut lines = Vec::new();
        for product in matches {
            let favourite = if product.favourite {
                self.red("*")
            } else {
                " ".to_string()
            };
            let amount = product
                .amount
                .as_deref()
                .map(|a| format!(" {}", self.dim(a)))
                .unwrap_or_default();
            lines.push(format!(
                "{favourite} {:>9}  {}{}  {:.2} {}",
                product.id,
                self.bold(&product.name),
                amount,
                product.price,
                product.currency,
            ));
        }
        lines.join("\n")
    }

    /// Formats a shopping list with its items.
    pub fn format_list(&self, list: &ShoppingList) -> String {
        let mut lines = vec![format!(
            "{} {}",
            self.bold(&list.name),
            self.dim(&format!("({})", list.id))
        )];
        if list.items.is_empty() {
            lines.push(self.dim("(empty)"));
        }
        for item in &list.items {
            lines.push(format!(
                "{:>3}x {}  {}",
                item.quantity,
                item.name,
                self.dim(&format!("[{}]", item.product_id)),
            ));
        }
        lines.join("\n")
    }

    /// Marks values carried forward from an older cycle.
    fn stale_marker<T>(&self, polled: &Polled<T>) -> String {
        if polled.is_stale(Duration::minutes(STALE_AFTER_MINUTES)) {
            format!(" {}", self.yellow("(stale)"))
        } else {
            String::new()
        }
    }

    // ------------------------------------------------------------------
    // Color helpers
    // ------------------------------------------------------------------

    fn paint(&self, color: &str, text: &str) -> String {
        if self.use_colors {
            format!("{color}{text}{RESET}")
        } else {
            text.to_string()
        }
    }

    fn bold(&self, text: &str) -> String {
        self.paint(BOLD, text)
    }

    fn dim(&self, text: &str) -> String {
        self.paint(DIM, text)
    }

    fn green(&self, text: &str) -> String {
        self.paint(GREEN, text)
    }

    fn yellow(&self, text: &str) -> String {
        self.paint(YELLOW, text)
    }

    fn red(&self, text: &str) -> String {
        self.paint(RED, text)
    }

    fn cyan(&self, text: &str) -> String {
        self.paint(CYAN, text)
    }
}

/// Renders a delivery slot, preferring the upstream description.
fn format_slot(slot: &DeliverySlot) -> String {
    if let Some(description) = &slot.description {
        return description.clone();
    }
    match (slot.since, slot.till) {
        (Some(since), Some(till)) => {
            format!(
                "{} - {}",
                format_local(since),
                DateTime::<Local>::from(till).format("%H:%M")
            )
        }
        (Some(since), None) => format_local(since),
        _ => "unknown".to_string(),
    }
}

fn format_local(time: DateTime<Utc>) -> String {
    DateTime::<Local>::from(time)
        .format("%Y-%m-%d %H:%M")
        .to_string()
}
