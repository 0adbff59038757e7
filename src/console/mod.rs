//! Interactive terminal menu over the record store and the partner order listing.

pub mod table;

use crate::domain::interaction::{ISSUE_KIND, Interaction, NewInteraction};
use crate::domain::order::OrderQuery;
use crate::services::interaction_service::InteractionService;
use crate::services::partner_service::PartnerService;
use serde_json::{Value, json};
use std::io;
use table::{Table, truncate};
use time::OffsetDateTime;
use time::macros::format_description;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, Lines};

const MENU: &str = "
1) List All Records
2) List Issues
3) List Orders
4) Query by ID
5) Insert New Record
6) Exit
";

const DETAILS_WIDTH: usize = 50;
const LONG_TEXT_WIDTH: usize = 60;

fn timestamp(ts: OffsetDateTime) -> String {
    ts.format(format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"))
        .unwrap_or_else(|_| ts.to_string())
}

/// Menu loop reading choices line by line. Service errors are printed and the loop
/// continues; end of input exits.
#[derive(Debug)]
pub struct Console<R, W> {
    lines: Lines<R>,
    output: W,
    interactions: InteractionService,
    partner: PartnerService,
    user_id: String,
}

impl<R, W> Console<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(
        input: R,
        output: W,
        interactions: InteractionService,
        partner: PartnerService,
        user_id: impl Into<String>,
    ) -> Self {
        Self { lines: input.lines(), output, interactions, partner, user_id: user_id.into() }
    }

    /// Runs until the user picks Exit or input ends.
    ///
    /// # Errors
    /// Returns an error only if reading input or writing output fails.
    pub async fn run(mut self) -> io::Result<()> {
        loop {
            self.say(MENU).await?;
            let Some(choice) = self.prompt("Select Action").await? else {
                return Ok(());
            };

            match choice.as_str() {
                "1" => self.list_records().await?,
                "2" => self.list_issues().await?,
                "3" => self.list_orders().await?,
                "4" => self.query_by_id().await?,
                "5" => self.insert_record().await?,
                "6" => {
                    self.say("Exiting...\n").await?;
                    return Ok(());
                }
                other => self.say(&format!("Invalid choice: {other}\n")).await?,
            }
        }
    }

    async fn say(&mut self, text: &str) -> io::Result<()> {
        self.output.write_all(text.as_bytes()).await?;
        self.output.flush().await
    }

    /// Prints `label` and reads one trimmed line; `None` at end of input.
    async fn prompt(&mut self, label: &str) -> io::Result<Option<String>> {
        self.say(&format!("{label}: ")).await?;
        Ok(self.lines.next_line().await?.map(|line| line.trim().to_string()))
    }

    async fn list_records(&mut self) -> io::Result<()> {
        let result = self.interactions.list_records().await;
        let records = match result {
            Ok(records) => records,
            Err(e) => return self.say(&format!("Error fetching records: {e}\n")).await,
        };
        if records.is_empty() {
            return self.say("No records found in the database\n").await;
        }

        let mut table = Table::new(["ID", "UserID", "Type", "Details", "Status", "CreatedAt"]);
        for record in records {
            table.push([
                record.id.to_string(),
                record.user_id.to_string(),
                record.kind,
                truncate(&record.details.to_string(), DETAILS_WIDTH),
                record.status,
                timestamp(record.created_at),
            ]);
        }

        self.say("\nRecords from chatbot.interactions:\n").await?;
        self.say(&table.render()).await
    }

    async fn list_issues(&mut self) -> io::Result<()> {
        let result = self.interactions.list_issues().await;
        let issues = match result {
            Ok(issues) => issues,
            Err(e) => return self.say(&format!("Error fetching issues: {e}\n")).await,
        };
        if issues.is_empty() {
            return self.say("No issues found in the database\n").await;
        }

        let mut table = Table::new(["Type", "Name", "Product", "Description", "Phone Number", "Status", "CreatedAt"]);
        for issue in &issues {
            table.push([
                issue.detail("type"),
                issue.detail("name"),
                issue.detail("product"),
                truncate(&issue.detail("description"), LONG_TEXT_WIDTH),
                issue.detail("phone_number"),
                issue.detail("status"),
                timestamp(issue.created_at),
            ]);
        }

        self.say("\nIssues from chatbot.interactions:\n").await?;
        self.say(&table.render()).await
    }

    async fn list_orders(&mut self) -> io::Result<()> {
        let defaults = OrderQuery::default();

        let Some(page) = self.prompt("Enter Page (default 1)").await? else { return Ok(()) };
        let Some(page) = parse_or(&page, defaults.page) else {
            return self.say("Invalid page number\n").await;
        };

        let Some(limit) = self.prompt("Enter Limit (default 10)").await? else { return Ok(()) };
        let Some(limit) = parse_or(&limit, defaults.limit) else {
            return self.say("Invalid limit number\n").await;
        };

        let Some(status) = self.prompt("Enter Status (e.g., pending, shipped, optional)").await? else {
            return Ok(());
        };

        let query = OrderQuery {
            page,
            limit,
            status: Some(status).filter(|s| !s.is_empty()),
            archived: Some(false),
            ..defaults
        };

        let result = self.partner.list_orders(&self.user_id, &query).await;
        let orders = match result {
            Ok(orders) => orders,
            Err(e) => return self.say(&format!("Error fetching orders: {e}\n")).await,
        };
        if orders.is_empty() {
            return self.say("No orders found\n").await;
        }

        let mut table = Table::new(["ID", "Name", "Address", "Note", "Email", "Phone", "City", "Status", "CreatedAt"]);
        for order in orders {
            let customer = order.customer;
            table.push([
                order.id,
                customer.name,
                truncate(&customer.address, LONG_TEXT_WIDTH),
                customer.note,
                customer.email,
                customer.phone,
                customer.city,
                order.status,
                timestamp(order.created_at),
            ]);
        }

        self.say("\nOrders from Converty.shop:\n").await?;
        self.say(&table.render()).await
    }

    async fn query_by_id(&mut self) -> io::Result<()> {
        let Some(raw) = self.prompt("Enter Record ID").await? else { return Ok(()) };
        let Ok(id) = raw.parse::<i64>() else {
            return self.say("Invalid ID format\n").await;
        };

        let result = self.interactions.find_record(id).await;
        match result {
            Ok(record) => self.say(&describe(&record)).await,
            Err(e) => self.say(&format!("Error: {e}\n")).await,
        }
    }

    async fn insert_record(&mut self) -> io::Result<()> {
        let Some(raw) = self.prompt("Enter User ID").await? else { return Ok(()) };
        let Ok(user_id) = raw.parse::<i64>() else {
            return self.say("Invalid User ID format\n").await;
        };

        let Some(kind) = self.prompt("Enter Table Type (address/order/issue)").await? else { return Ok(()) };

        let details = if kind == ISSUE_KIND {
            let Some(details) = self.prompt_issue_details().await? else { return Ok(()) };
            details
        } else {
            let Some(raw) = self.prompt("Enter JSON Details (e.g., {\"key\": \"value\"})").await? else {
                return Ok(());
            };
            match serde_json::from_str::<Value>(&raw) {
                Ok(details) if details.is_object() => details,
                Ok(_) => return self.say("Invalid JSON format: details must be an object\n").await,
                Err(e) => return self.say(&format!("Invalid JSON format: {e}\n")).await,
            }
        };

        let Some(status) = self.prompt("Enter Table Status (pending/completed)").await? else { return Ok(()) };

        let new = NewInteraction { user_id, kind, details, status };
        let result = self.interactions.insert_record(new).await;
        match result {
            Ok(record) => self.say(&format!("Record created successfully! (ID {})\n", record.id)).await,
            Err(e) => self.say(&format!("Error inserting record: {e}\n")).await,
        }
    }

    async fn prompt_issue_details(&mut self) -> io::Result<Option<Value>> {
        const FIELDS: [(&str, &str); 6] = [
            ("type", "Enter Issue Type (e.g., defective, delivery)"),
            ("name", "Enter Name"),
            ("product", "Enter Product"),
            ("description", "Enter Description"),
            ("phone_number", "Enter Phone Number"),
            ("status", "Enter Detail Status (e.g., Pending, Resolved)"),
        ];

        let mut details = serde_json::Map::new();
        for (key, label) in FIELDS {
            let Some(value) = self.prompt(label).await? else { return Ok(None) };
            details.insert(key.to_string(), json!(value));
        }
        Ok(Some(Value::Object(details)))
    }
}

/// Empty input selects `default`; anything else must parse as a positive number.
fn parse_or(raw: &str, default: u32) -> Option<u32> {
    if raw.is_empty() {
        return Some(default);
    }
    raw.parse().ok().filter(|n| *n > 0)
}

fn describe(record: &Interaction) -> String {
    let details = serde_json::to_string_pretty(&record.details).unwrap_or_else(|_| record.details.to_string());
    format!(
        "ID: {}\nUserID: {}\nType: {}\nDetails: {}\nStatus: {}\nCreatedAt: {}\n",
        record.id,
        record.user_id,
        record.kind,
        details,
        record.status,
        timestamp(record.created_at)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::converty::PartnerApi;
    use crate::adapters::memory::{InMemoryInteractionStore, InMemoryTokenStore};
    use crate::config::OAuthConfig;
    use crate::domain::token::TokenRecord;
    use crate::services::stores::TokenStore;
    use crate::services::token_service::TokenService;
    use std::sync::Arc;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn services(base_url: &str) -> (InteractionService, PartnerService, Arc<InMemoryTokenStore>) {
        let config = OAuthConfig {
            client_id: "client".to_string(),
            client_secret: "secret".to_string(),
            redirect_uri: "http://localhost:9001/api/v1/callback".to_string(),
            authorize_url: format!("{base_url}/oauth2/authorize"),
            token_url: format!("{base_url}/oauth2/token"),
            scope: "read-orders".to_string(),
            default_user_id: "user1".to_string(),
            state_ttl_secs: 600,
            refresh_token_ttl_secs: None,
        };
        let http = reqwest::Client::new();
        let store = Arc::new(InMemoryTokenStore::new());
        let tokens = TokenService::new(&config, http.clone(), store.clone());
        (
            InteractionService::new(Arc::new(InMemoryInteractionStore::new())),
            PartnerService::new(PartnerApi::new(http, base_url), tokens, None),
            store,
        )
    }

    async fn run_script(script: &str, interactions: InteractionService, partner: PartnerService) -> String {
        let mut output = Vec::new();
        Console::new(script.as_bytes(), &mut output, interactions, partner, "user1").run().await.unwrap();
        String::from_utf8(output).unwrap()
    }

    #[tokio::test]
    async fn test_insert_then_list_issue() {
        let (interactions, partner, _) = services("http://127.0.0.1:9");
        let long_description = "The lid arrived cracked and the handle came off after a single wash";
        let script = format!("5\n42\nissue\ndefective\nAmine\nMug\n{long_description}\n22000000\nPending\nopen\n2\n6\n");

        let output = run_script(&script, interactions.clone(), partner).await;

        assert!(output.contains("Record created successfully! (ID 1)"));
        assert!(output.contains("Issues from chatbot.interactions:"));
        assert!(output.contains("| defective |"));
        assert!(output.contains(&truncate(long_description, LONG_TEXT_WIDTH)));
        assert!(!output.contains(long_description));
        assert!(output.ends_with("Exiting...\n"));

        let stored = interactions.find_record(1).await.unwrap();
        assert_eq!(stored.details["phone_number"], "22000000");
        assert_eq!(stored.status, "open");
    }

    #[tokio::test]
    async fn test_errors_are_reported_and_loop_continues() {
        let (interactions, partner, _) = services("http://127.0.0.1:9");
        let script = "4\nabc\n4\n7\n5\n1\norder\n[1,2]\n9\n1\n";

        let output = run_script(script, interactions, partner).await;

        assert!(output.contains("Invalid ID format"));
        assert!(output.contains("Error: Record with ID 7 not found"));
        assert!(output.contains("Invalid JSON format"));
        assert!(output.contains("Invalid choice: 9"));
        assert!(output.contains("No records found in the database"));
        // End of input exits without the farewell.
        assert!(!output.contains("Exiting..."));
    }

    #[tokio::test]
    async fn test_list_orders_without_token_prints_error() {
        let (interactions, partner, _) = services("http://127.0.0.1:9");

        let output = run_script("3\n\n\n\n6\n", interactions, partner).await;
        assert!(output.contains("Error fetching orders: No token found, please re-authenticate via /login"));
    }

    #[tokio::test]
    async fn test_list_orders_uses_defaults_and_excludes_archived() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/orders"))
            .and(query_param("page", "1"))
            .and(query_param("limit", "10"))
            .and(query_param("archived", "false"))
            .and(query_param("status", "pending"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "data": [{
                    "id": "o-1",
                    "customer": { "name": "Sarra", "city": "Sousse" },
                    "status": "pending",
                    "created_at": "2024-06-30T08:15:00Z"
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let (interactions, partner, store) = services(&server.uri());
        let now = OffsetDateTime::now_utc();
        store
            .upsert(&TokenRecord {
                user_id: "user1".to_string(),
                access_token: "access".to_string(),
                refresh_token: "refresh".to_string(),
                token_type: "Bearer".to_string(),
                expires_in: 3600,
                issued_at: now,
                expires_at: now + time::Duration::hours(1),
                refresh_issued_at: now,
                refresh_expires_at: now + time::Duration::hours(1),
            })
            .await
            .unwrap();

        let output = run_script("3\n\n\npending\n6\n", interactions, partner).await;
        assert!(output.contains("Orders from Converty.shop:"));
        assert!(output.contains("| o-1 | Sarra |"));
        assert!(output.contains("2024-06-30 08:15:00"));
    }
}
