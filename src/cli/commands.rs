use std::str::FromStr;

use chrono::{Local, NaiveDate};
use rust_decimal::Decimal;
use uuid::Uuid;

use super::output;
use super::CommandError;
use crate::config::{Config, ConfigManager, CONFIG_KEYS};
use crate::core::services::{
    AuthProvider, AuthService, CardService, Dashboard, JsonAuth, SummaryService,
    TransactionService,
};
use crate::core::Session;
use crate::currency::{format_amount, month_name};
use crate::errors::{PlannerError, Result};
use crate::ledger::{
    categories_for, CategoryTotal, InstallmentPlan, Totals, Transaction, TransactionDraft,
    TransactionKind, YearMonth,
};
use crate::storage::{CachedStore, JsonStore, TransactionStore};

const TODAY_ENV: &str = "PLANNER_TODAY";

pub type CommandResult = std::result::Result<LoopControl, CommandError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopControl {
    Continue,
    Exit,
}

pub const COMMANDS: &[(&str, &str)] = &[
    ("help", "Show this list"),
    ("signup <email> <password>", "Create an account"),
    ("login <email> <password>", "Sign in and open your book"),
    ("logout", "Sign out"),
    ("add <type> <amount> <category> <date|today> [description]", "Record a single transaction"),
    ("loan <amount> <count> <category> <date|today> [description]", "Record monthly installments"),
    ("card add <name> <limit> <due_day> <closing_day>", "Register a credit card"),
    ("cards", "List credit cards"),
    ("buy <card> <amount> <count> <category> <date|today> [description]", "Charge installments to a card"),
    ("delete <id>", "Delete a transaction"),
    ("summary [YYYY-MM]", "Lifetime and monthly totals"),
    ("history [YYYY-MM]", "Transactions of one month"),
    ("trend", "Monthly balances with running total"),
    ("categories [type]", "Valid categories"),
    ("config [show|set <key> <value>]", "View or change preferences"),
    ("exit", "Leave the shell"),
];

pub struct ShellContext {
    store: Box<dyn TransactionStore>,
    auth: Box<dyn AuthProvider>,
    config: Config,
    config_manager: Option<ConfigManager>,
    session: Option<Session>,
    today: NaiveDate,
}

impl ShellContext {
    pub fn new(
        store: Box<dyn TransactionStore>,
        auth: Box<dyn AuthProvider>,
        config: Config,
        today: NaiveDate,
    ) -> Self {
        Self {
            store,
            auth,
            config,
            config_manager: None,
            session: None,
            today,
        }
    }

    /// Persists `config` changes through `manager`.
    pub fn with_config_manager(mut self, manager: ConfigManager) -> Self {
        self.config_manager = Some(manager);
        self
    }

    /// Builds a context from the configured data directory.
    pub fn from_env() -> Result<Self> {
        let manager = ConfigManager::new()?;
        let config = manager.load()?;
        let store = JsonStore::new(manager.store_dir(&config))?;
        let cached = CachedStore::with_ttl(store, config.cache_ttl());
        let auth = JsonAuth::new(manager.accounts_path());
        Ok(Self::new(Box::new(cached), Box::new(auth), config, today_from_env()?)
            .with_config_manager(manager))
    }

    pub fn prompt(&self) -> String {
        match &self.session {
            Some(session) => format!("planner[{}]> ", session.email),
            None => "planner> ".into(),
        }
    }

    pub fn dispatch(&mut self, command: &str, args: &[&str]) -> CommandResult {
        match command {
            "help" => self.help(),
            "signup" => self.signup(args),
            "login" => self.login(args),
            "logout" => self.logout(),
            "add" => self.add(args),
            "loan" => self.loan(args),
            "card" => self.card(args),
            "cards" => self.cards(),
            "buy" => self.buy(args),
            "delete" => self.delete(args),
            "summary" => self.summary(args),
            "history" => self.history(args),
            "trend" => self.trend(),
            "categories" => self.categories(args),
            "config" => self.config_command(args),
            "exit" | "quit" => Ok(LoopControl::Exit),
            other => Err(CommandError::Usage(format!(
                "unknown command `{other}`, try `help`"
            ))),
        }
    }

    fn session(&self) -> std::result::Result<&Session, CommandError> {
        self.session
            .as_ref()
            .ok_or_else(|| CommandError::Usage("login <email> <password> first".into()))
    }

    fn money(&self, amount: Decimal) -> String {
        format_amount(amount, &self.config.currency_symbol)
    }

    fn help(&self) -> CommandResult {
        output::section("Commands");
        for (usage, about) in COMMANDS {
            output::info(format!("  {usage:<68} {about}"));
        }
        Ok(LoopControl::Continue)
    }

    fn signup(&mut self, args: &[&str]) -> CommandResult {
        let [email, password] = args else {
            return Err(CommandError::Usage("signup <email> <password>".into()));
        };
        AuthService::sign_up(self.auth.as_ref(), email, password)?;
        output::success("Account created. Sign in with `login`.");
        Ok(LoopControl::Continue)
    }

    fn login(&mut self, args: &[&str]) -> CommandResult {
        let [email, password] = args else {
            return Err(CommandError::Usage("login <email> <password>".into()));
        };
        let session = AuthService::sign_in(self.auth.as_ref(), email, password)?;
        output::success(format!("Logged in as {}", session.email));
        self.session = Some(session);
        Ok(LoopControl::Continue)
    }

    fn logout(&mut self) -> CommandResult {
        if let Some(session) = self.session.take() {
            AuthService::sign_out(self.auth.as_ref(), session)?;
            output::success("Logged out");
        }
        Ok(LoopControl::Continue)
    }

    fn config_command(&mut self, args: &[&str]) -> CommandResult {
        match args {
            [] | ["show"] => {
                output::section("Configuration");
                output::info(format!("  currency_symbol  {}", self.config.currency_symbol));
                output::info(format!("  cache_ttl_secs   {}", self.config.cache_ttl_secs));
                let data_dir = self
                    .config
                    .data_dir
                    .as_ref()
                    .map_or_else(|| "(default)".to_string(), |dir| dir.display().to_string());
                output::info(format!("  data_dir         {data_dir}"));
            }
            ["set", key, value @ ..] if !value.is_empty() => {
                let mut updated = self.config.clone();
                updated.set(key, &value.join(" "))?;
                if let Some(manager) = &self.config_manager {
                    manager.save(&updated)?;
                }
                self.config = updated;
                output::success(format!("{key} updated"));
                if *key != "currency_symbol" {
                    output::info("The new value applies the next time the shell starts.");
                }
            }
            _ => {
                return Err(CommandError::Usage(format!(
                    "config [show|set <{}> <value>]",
                    CONFIG_KEYS.join("|")
                )))
            }
        }
        Ok(LoopControl::Continue)
    }

    fn add(&mut self, args: &[&str]) -> CommandResult {
        const USAGE: &str = "add <type> <amount> <category> <date|today> [description]";
        if args.len() < 4 {
            return Err(CommandError::Usage(USAGE.into()));
        }
        let session = self.session()?;
        let kind = TransactionKind::from_str(args[0])?;
        let amount = parse_amount(args[1])?;
        let date = parse_date(args[3], self.today)?;
        let draft = TransactionDraft::new(session.user_id(), kind, amount, args[2], date)
            .with_description(args[4..].join(" "));
        let txn = TransactionService::record(self.store.as_ref(), session, draft)?;
        output::success(format!(
            "Recorded {} {} on {} ({})",
            txn.kind,
            self.money(txn.amount),
            txn.date,
            txn.id
        ));
        Ok(LoopControl::Continue)
    }

    fn loan(&mut self, args: &[&str]) -> CommandResult {
        const USAGE: &str = "loan <amount> <count> <category> <date|today> [description]";
        if args.len() < 4 {
            return Err(CommandError::Usage(USAGE.into()));
        }
        let session = self.session()?;
        let plan = InstallmentPlan::new(
            parse_amount(args[0])?,
            args[2],
            parse_date(args[3], self.today)?,
            parse_count(args[1])?,
        )
        .with_description(args[4..].join(" "));
        let created = TransactionService::record_installments(self.store.as_ref(), session, &plan)?;
        self.report_installments(&created);
        Ok(LoopControl::Continue)
    }

    fn buy(&mut self, args: &[&str]) -> CommandResult {
        const USAGE: &str = "buy <card> <amount> <count> <category> <date|today> [description]";
        if args.len() < 5 {
            return Err(CommandError::Usage(USAGE.into()));
        }
        let session = self.session()?;
        let card = CardService::find_by_name(self.store.as_ref(), session, args[0])?
            .ok_or_else(|| PlannerError::CardNotFound(args[0].to_string()))?;
        let plan = InstallmentPlan::new(
            parse_amount(args[1])?,
            args[3],
            parse_date(args[4], self.today)?,
            parse_count(args[2])?,
        )
        .with_description(args[5..].join(" "));
        let created =
            TransactionService::record_card_purchase(self.store.as_ref(), session, card.id, plan)?;
        self.report_installments(&created);
        Ok(LoopControl::Continue)
    }

    fn report_installments(&self, created: &[Transaction]) {
        output::success(format!("Recorded {} installments", created.len()));
        for txn in created {
            output::info(format!(
                "  {}  {:<32} {}",
                txn.date,
                txn.description,
                self.money(txn.amount)
            ));
        }
    }

    fn card(&mut self, args: &[&str]) -> CommandResult {
        const USAGE: &str = "card add <name> <limit> <due_day> <closing_day>";
        if args.len() != 5 || args[0] != "add" {
            return Err(CommandError::Usage(USAGE.into()));
        }
        let session = self.session()?;
        let card = CardService::add(
            self.store.as_ref(),
            session,
            args[1],
            parse_amount_allow_zero(args[2])?,
            parse_day(args[3])?,
            parse_day(args[4])?,
        )?;
        output::success(format!(
            "Added card {} (closes on {}, due on {})",
            card.name, card.closing_day, card.due_day
        ));
        Ok(LoopControl::Continue)
    }

    fn cards(&mut self) -> CommandResult {
        let session = self.session()?;
        let cards = CardService::list(self.store.as_ref(), session)?;
        if cards.is_empty() {
            output::info("No cards registered.");
        }
        for card in cards {
            output::info(format!(
                "  {:<20} limit {:>16}  closes {:>2}  due {:>2}",
                card.name,
                self.money(card.limit),
                card.closing_day,
                card.due_day
            ));
        }
        Ok(LoopControl::Continue)
    }

    fn delete(&mut self, args: &[&str]) -> CommandResult {
        let raw = args
            .first()
            .ok_or_else(|| CommandError::Usage("delete <id>".into()))?;
        let id = Uuid::parse_str(raw)
            .map_err(|_| PlannerError::InvalidInput(format!("`{raw}` is not a transaction id")))?;
        let session = self.session()?;
        TransactionService::delete(self.store.as_ref(), session, id)?;
        output::success("Transaction deleted");
        Ok(LoopControl::Continue)
    }

    fn dashboard(&self, args: &[&str]) -> std::result::Result<Dashboard, CommandError> {
        let session = self.session()?;
        let selected = args.first().map(|raw| raw.parse::<YearMonth>()).transpose()?;
        Ok(SummaryService::dashboard(
            self.store.as_ref(),
            session,
            self.today,
            selected,
        )?)
    }

    fn summary(&mut self, args: &[&str]) -> CommandResult {
        let dashboard = self.dashboard(args)?;
        if dashboard.trend.is_empty() {
            output::info("No transactions found. Add your first transaction with `add`.");
        }

        output::section("Overview (lifetime)");
        self.print_totals(&dashboard.lifetime);

        let period = dashboard.period;
        output::section(format!("Summary of {}/{}", month_name(period.month), period.year));
        self.print_totals(&dashboard.month);

        output::section("Expenses by category");
        self.print_breakdown(&dashboard.expenses_by_category, "No expenses in this period.");
        output::section("Investments by category");
        self.print_breakdown(&dashboard.investments_by_category, "No investments in this period.");
        Ok(LoopControl::Continue)
    }

    fn print_totals(&self, totals: &Totals) {
        output::info(format!("  Income       {}", self.money(totals.income)));
        output::info(format!("  Expense      {}", self.money(totals.expense)));
        output::info(format!("  Balance      {}", self.money(totals.balance())));
        output::info(format!("  Investments  {}", self.money(totals.investment)));
    }

    fn print_breakdown(&self, slices: &[CategoryTotal], empty: &str) {
        if slices.is_empty() {
            output::info(format!("  {empty}"));
        }
        for slice in slices {
            output::info(format!("  {:<22} {}", slice.category, self.money(slice.total)));
        }
    }

    fn history(&mut self, args: &[&str]) -> CommandResult {
        let dashboard = self.dashboard(args)?;
        let period = dashboard.period;
        output::section(format!("Transactions of {}/{}", month_name(period.month), period.year));
        if dashboard.history.is_empty() {
            output::info("  No transactions for this month.");
        }
        for txn in &dashboard.history {
            output::info(format!(
                "  {}  {:<32} {:<20} {:<10} {:>16}  {}",
                txn.date,
                txn.description,
                txn.category,
                txn.kind,
                self.money(txn.amount),
                txn.id
            ));
        }
        Ok(LoopControl::Continue)
    }

    fn trend(&mut self) -> CommandResult {
        let session = self.session()?;
        let trend = SummaryService::trend(self.store.as_ref(), session)?;
        output::section("Monthly balance");
        for row in trend {
            output::info(format!(
                "  {}  income {:>16}  expense {:>16}  balance {:>16}  running {:>16}",
                row.period,
                self.money(row.income),
                self.money(row.expense),
                self.money(row.balance),
                self.money(row.cumulative_balance)
            ));
        }
        Ok(LoopControl::Continue)
    }

    fn categories(&mut self, args: &[&str]) -> CommandResult {
        let kinds = match args.first() {
            Some(raw) => vec![TransactionKind::from_str(raw)?],
            None => TransactionKind::ALL.to_vec(),
        };
        for kind in kinds {
            output::info(format!("{kind}: {}", categories_for(kind).join(", ")));
        }
        Ok(LoopControl::Continue)
    }
}

fn today_from_env() -> Result<NaiveDate> {
    match std::env::var(TODAY_ENV) {
        Ok(raw) => parse_date(&raw, Local::now().date_naive()),
        Err(_) => Ok(Local::now().date_naive()),
    }
}

pub fn parse_date(raw: &str, today: NaiveDate) -> Result<NaiveDate> {
    if raw.eq_ignore_ascii_case("today") {
        return Ok(today);
    }
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| PlannerError::InvalidInput(format!("expected YYYY-MM-DD, got `{raw}`")))
}

/// Parses a strictly positive amount; accepts `,` as the decimal separator.
pub fn parse_amount(raw: &str) -> Result<Decimal> {
    let amount = parse_amount_allow_zero(raw)?;
    if amount <= Decimal::ZERO {
        return Err(PlannerError::InvalidInput(format!(
            "amount must be positive, got {raw}"
        )));
    }
    Ok(amount)
}

fn parse_amount_allow_zero(raw: &str) -> Result<Decimal> {
    let normalized = raw.trim().replace(',', ".");
    Decimal::from_str(&normalized)
        .map_err(|_| PlannerError::InvalidInput(format!("`{raw}` is not a valid amount")))
}

fn parse_count(raw: &str) -> Result<u32> {
    raw.trim()
        .parse::<u32>()
        .map_err(|_| PlannerError::InvalidInput(format!("`{raw}` is not a valid installment count")))
}

fn parse_day(raw: &str) -> Result<u32> {
    raw.trim()
        .parse::<u32>()
        .map_err(|_| PlannerError::InvalidInput(format!("`{raw}` is not a valid day of month")))
}
