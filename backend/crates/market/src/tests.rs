//! Unit tests for Market crate
//! Settlement atomicity, catalogue access, feedback permissions, router

#[cfg(test)]
mod support {
    use std::sync::Arc;

    use auth::{AccountRole, AuthenticatedAccount};
    use kernel::id::AccountId;
    use kernel::money::Money;

    use crate::application::config::MarketConfig;
    use crate::domain::entities::Project;
    use crate::domain::repository::ProjectRepository;
    use crate::domain::value_objects::Screenshots;
    use crate::infra::memory::InMemoryMarketStore;

    /// Owner, buyer and platform wallets plus one listed project
    pub struct Fixture {
        pub store: Arc<InMemoryMarketStore>,
        pub config: Arc<MarketConfig>,
        pub owner: AccountId,
        pub buyer: AccountId,
        pub platform: AccountId,
        pub project: Project,
    }

    pub fn money(units: u32) -> Money {
        Money::from_units(units)
    }

    pub fn member(account_id: AccountId) -> AuthenticatedAccount {
        AuthenticatedAccount {
            account_id,
            role: AccountRole::User,
        }
    }

    pub fn admin(account_id: AccountId) -> AuthenticatedAccount {
        AuthenticatedAccount {
            account_id,
            role: AccountRole::Admin,
        }
    }

    pub fn project(owner_id: AccountId, price: u32) -> Project {
        Project::new(
            owner_id,
            "Kanban board".to_string(),
            "A kanban board written in Rust".to_string(),
            "Kanban".to_string(),
            money(price),
            "https://files.example/kanban.zip".to_string(),
            Screenshots::default(),
        )
    }

    pub async fn fixture(buyer_balance: u32, price: u32) -> Fixture {
        let store = Arc::new(InMemoryMarketStore::new());
        let owner = AccountId::new();
        let buyer = AccountId::new();
        let platform = AccountId::new();

        store.set_balance(owner, Money::ZERO).await;
        store.set_balance(buyer, money(buyer_balance)).await;
        store.set_balance(platform, Money::ZERO).await;

        let project = project(owner, price);
        store.create_project(&project).await.unwrap();

        Fixture {
            store,
            config: Arc::new(MarketConfig::new(platform)),
            owner,
            buyer,
            platform,
            project,
        }
    }
}

#[cfg(test)]
mod settlement_tests {
    use std::sync::Arc;

    use kernel::id::{AccountId, ProjectId};
    use kernel::money::Money;
    use rust_decimal_macros::dec;
    use tokio_test::{assert_err, assert_ok};

    use super::support::{Fixture, fixture, money};
    use crate::application::config::MarketConfig;
    use crate::application::{SettleInput, SettleUseCase};
    use crate::domain::entities::Transaction;
    use crate::domain::repository::{ProjectRepository, TransactionRepository};
    use crate::domain::value_objects::TransactionStatus;
    use crate::error::MarketError;
    use crate::infra::memory::InMemoryMarketStore;

    fn settle_use_case(f: &Fixture) -> SettleUseCase<InMemoryMarketStore, InMemoryMarketStore> {
        SettleUseCase::new(f.store.clone(), f.store.clone(), f.config.clone())
    }

    fn purchase(f: &Fixture, amount: Money, commission: Option<Money>) -> SettleInput {
        SettleInput {
            project_id: f.project.project_id,
            buyer_id: f.buyer,
            amount,
            commission,
            status: TransactionStatus::Successful,
        }
    }

    async fn balances(f: &Fixture) -> (Money, Money, Money) {
        (
            f.store.balance(&f.buyer).await.unwrap(),
            f.store.balance(&f.owner).await.unwrap(),
            f.store.balance(&f.platform).await.unwrap(),
        )
    }

    async fn purchase_count(f: &Fixture) -> u64 {
        f.store
            .find_project(&f.project.project_id)
            .await
            .unwrap()
            .unwrap()
            .purchase_count
    }

    #[tokio::test]
    async fn test_successful_settlement_moves_value() {
        let f = fixture(100, 50).await;

        let tx = assert_ok!(
            settle_use_case(&f)
                .execute(purchase(&f, money(50), Some(money(10))))
                .await
        );

        assert_eq!(tx.amount, money(50));
        assert_eq!(tx.commission, money(10));
        assert_eq!(tx.status, TransactionStatus::Successful);
        assert_eq!(balances(&f).await, (money(50), money(40), money(10)));
        assert_eq!(purchase_count(&f).await, 1);
        assert!(f.store.find_transaction(&tx.transaction_id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_value_is_conserved() {
        let f = fixture(100, 50).await;
        let (b, o, p) = balances(&f).await;
        let before = b.amount() + o.amount() + p.amount();

        assert_ok!(
            settle_use_case(&f)
                .execute(purchase(&f, money(50), Some(money(7))))
                .await
        );

        let (b, o, p) = balances(&f).await;
        assert_eq!(b.amount() + o.amount() + p.amount(), before);
    }

    #[tokio::test]
    async fn test_insufficient_funds_writes_nothing() {
        let f = fixture(40, 50).await;

        let err = assert_err!(
            settle_use_case(&f)
                .execute(purchase(&f, money(50), Some(money(10))))
                .await
        );

        assert!(matches!(err, MarketError::InsufficientFunds));
        assert_eq!(balances(&f).await, (money(40), Money::ZERO, Money::ZERO));
        assert_eq!(purchase_count(&f).await, 0);
        assert_eq!(f.store.transaction_count().await, 0);
    }

    #[tokio::test]
    async fn test_exact_balance_is_enough() {
        let f = fixture(50, 50).await;

        assert_ok!(
            settle_use_case(&f)
                .execute(purchase(&f, money(50), Some(money(10))))
                .await
        );
        assert_eq!(balances(&f).await.0, Money::ZERO);
    }

    #[tokio::test]
    async fn test_failed_status_records_without_moving_value() {
        let f = fixture(100, 50).await;
        let mut input = purchase(&f, money(50), Some(money(10)));
        input.status = TransactionStatus::Failed;

        let tx = assert_ok!(settle_use_case(&f).execute(input).await);

        assert_eq!(tx.status, TransactionStatus::Failed);
        assert_eq!(balances(&f).await, (money(100), Money::ZERO, Money::ZERO));
        assert_eq!(purchase_count(&f).await, 0);
        assert_eq!(f.store.transaction_count().await, 1);
    }

    #[tokio::test]
    async fn test_missing_platform_account_rolls_back() {
        let f = fixture(100, 50).await;
        let f = Fixture {
            config: Arc::new(MarketConfig::new(AccountId::new())),
            ..f
        };

        let err = assert_err!(
            settle_use_case(&f)
                .execute(purchase(&f, money(50), Some(money(10))))
                .await
        );

        assert!(matches!(err, MarketError::PlatformAccountNotFound));
        assert_eq!(err.to_string(), "Admin not found");
        assert_eq!(balances(&f).await, (money(100), Money::ZERO, Money::ZERO));
        assert_eq!(purchase_count(&f).await, 0);
        assert_eq!(f.store.transaction_count().await, 0);
    }

    #[tokio::test]
    async fn test_missing_owner_rolls_back() {
        let f = fixture(100, 50).await;
        let orphan = super::support::project(AccountId::new(), 50);
        f.store.create_project(&orphan).await.unwrap();

        let mut input = purchase(&f, money(50), Some(money(10)));
        input.project_id = orphan.project_id;
        let err = assert_err!(settle_use_case(&f).execute(input).await);

        assert!(matches!(err, MarketError::OwnerNotFound));
        assert_eq!(balances(&f).await, (money(100), Money::ZERO, Money::ZERO));
        assert_eq!(f.store.transaction_count().await, 0);
    }

    #[tokio::test]
    async fn test_missing_buyer() {
        let f = fixture(100, 50).await;
        let mut input = purchase(&f, money(50), None);
        input.buyer_id = AccountId::new();

        let err = assert_err!(settle_use_case(&f).execute(input).await);
        assert!(matches!(err, MarketError::BuyerNotFound));
    }

    #[tokio::test]
    async fn test_missing_project() {
        let f = fixture(100, 50).await;
        let mut input = purchase(&f, money(50), None);
        input.project_id = ProjectId::new();

        let err = assert_err!(settle_use_case(&f).execute(input).await);
        assert!(matches!(err, MarketError::ProjectNotFound));
    }

    #[tokio::test]
    async fn test_amount_must_match_price() {
        let f = fixture(100, 50).await;

        let err = assert_err!(
            settle_use_case(&f)
                .execute(purchase(&f, money(1), Some(Money::ZERO)))
                .await
        );
        assert!(matches!(err, MarketError::PriceMismatch));
        assert_eq!(balances(&f).await.0, money(100));
    }

    #[tokio::test]
    async fn test_any_amount_when_list_price_not_required() {
        let f = fixture(100, 50).await;
        let f = Fixture {
            config: Arc::new(MarketConfig {
                require_list_price: false,
                ..MarketConfig::new(f.platform)
            }),
            ..f
        };

        assert_ok!(
            settle_use_case(&f)
                .execute(purchase(&f, money(30), Some(money(3))))
                .await
        );
        assert_eq!(balances(&f).await, (money(70), money(27), money(3)));
    }

    #[tokio::test]
    async fn test_commission_above_amount_rejected() {
        let f = fixture(100, 50).await;

        let err = assert_err!(
            settle_use_case(&f)
                .execute(purchase(&f, money(50), Some(money(60))))
                .await
        );
        assert!(matches!(err, MarketError::InvalidAmount(_)));
        assert_eq!(f.store.transaction_count().await, 0);
    }

    #[tokio::test]
    async fn test_default_commission_from_rate() {
        let f = fixture(100, 50).await;

        let tx = assert_ok!(settle_use_case(&f).execute(purchase(&f, money(50), None)).await);

        // 10% of 50
        assert_eq!(tx.commission, money(5));
        assert_eq!(balances(&f).await, (money(50), money(45), money(5)));
    }

    #[tokio::test]
    async fn test_default_commission_rounds_down_to_cents() {
        let f = fixture(100, 50).await;
        let f = Fixture {
            config: Arc::new(MarketConfig {
                require_list_price: false,
                ..MarketConfig::new(f.platform)
            }),
            ..f
        };
        let amount = Money::new(dec!(0.99)).unwrap();

        let tx = assert_ok!(settle_use_case(&f).execute(purchase(&f, amount, None)).await);
        assert_eq!(tx.commission, Money::new(dec!(0.09)).unwrap());
        assert_eq!(tx.owner_share(), Money::new(dec!(0.90)).unwrap());
    }

    #[tokio::test]
    async fn test_owner_buying_own_project() {
        let f = fixture(100, 50).await;
        let mut input = purchase(&f, money(50), Some(money(10)));
        input.buyer_id = f.owner;
        f.store.set_balance(f.owner, money(60)).await;

        assert_ok!(settle_use_case(&f).execute(input).await);
        // -50 then +40
        assert_eq!(f.store.balance(&f.owner).await.unwrap(), money(50));
        assert_eq!(f.store.balance(&f.platform).await.unwrap(), money(10));
    }

    #[tokio::test]
    async fn test_concurrent_purchases_never_overdraw() {
        let f = fixture(120, 50).await;
        let use_case = Arc::new(settle_use_case(&f));

        let mut handles = Vec::new();
        for _ in 0..5 {
            let use_case = use_case.clone();
            let input = purchase(&f, money(50), Some(money(10)));
            handles.push(tokio::spawn(async move { use_case.execute(input).await }));
        }

        let mut settled: Vec<Transaction> = Vec::new();
        for handle in handles {
            if let Ok(tx) = handle.await.unwrap() {
                settled.push(tx);
            }
        }

        assert_eq!(settled.len(), 2);
        assert_eq!(balances(&f).await, (money(20), money(80), money(20)));
        assert_eq!(purchase_count(&f).await, 2);
        assert_eq!(f.store.list_transactions().await.unwrap().len(), 2);
    }
}

#[cfg(test)]
mod transaction_tests {
    use kernel::id::{AccountId, TransactionId};
    use tokio_test::{assert_err, assert_ok};

    use super::support::{admin, fixture, member, money};
    use crate::application::{ManageTransactionsUseCase, SettleInput, SettleUseCase};
    use crate::domain::value_objects::TransactionStatus;
    use crate::error::MarketError;

    #[tokio::test]
    async fn test_transaction_visibility_and_admin_updates() {
        let f = fixture(100, 50).await;
        let tx = SettleUseCase::new(f.store.clone(), f.store.clone(), f.config.clone())
            .execute(SettleInput {
                project_id: f.project.project_id,
                buyer_id: f.buyer,
                amount: money(50),
                commission: None,
                status: TransactionStatus::Successful,
            })
            .await
            .unwrap();

        let manage = ManageTransactionsUseCase::new(f.store.clone());

        assert_ok!(manage.get(&tx.transaction_id, &member(f.buyer)).await);
        assert_ok!(manage.get(&tx.transaction_id, &admin(AccountId::new())).await);
        let err = assert_err!(manage.get(&tx.transaction_id, &member(f.owner)).await);
        assert!(matches!(err, MarketError::Forbidden(_)));

        let updated = assert_ok!(manage.update_status(&tx.transaction_id, "failed").await);
        assert_eq!(updated.status, TransactionStatus::Failed);
        // Status edits never touch balances
        assert_eq!(f.store.balance(&f.buyer).await.unwrap(), money(50));

        let err = assert_err!(manage.update_status(&tx.transaction_id, "pending").await);
        assert!(matches!(err, MarketError::InvalidStatus));

        assert_ok!(manage.delete(&tx.transaction_id).await);
        let err = assert_err!(manage.delete(&tx.transaction_id).await);
        assert!(matches!(err, MarketError::TransactionNotFound));
    }

    #[tokio::test]
    async fn test_unknown_transaction() {
        let f = fixture(100, 50).await;
        let manage = ManageTransactionsUseCase::new(f.store.clone());

        let err = assert_err!(manage.get(&TransactionId::new(), &admin(f.platform)).await);
        assert!(matches!(err, MarketError::TransactionNotFound));
        let err = assert_err!(manage.update_status(&TransactionId::new(), "failed").await);
        assert!(matches!(err, MarketError::TransactionNotFound));
    }
}

#[cfg(test)]
mod catalog_tests {
    use kernel::id::AccountId;
    use kernel::money::Money;
    use tokio_test::{assert_err, assert_ok};

    use super::support::{admin, fixture, member, money};
    use crate::application::{
        AddProjectInput, ProjectCatalogUseCase, SettleInput, SettleUseCase,
    };
    use crate::domain::value_objects::TransactionStatus;
    use crate::error::MarketError;

    fn listing(screenshots: usize) -> AddProjectInput {
        AddProjectInput {
            title: "  Chess engine ".to_string(),
            description: "Bitboard chess engine".to_string(),
            short_description: "Chess".to_string(),
            price: money(25),
            source_url: "https://files.example/chess.zip".to_string(),
            screenshots: (0..screenshots)
                .map(|i| format!("https://img.example/{i}.png"))
                .collect(),
        }
    }

    #[tokio::test]
    async fn test_add_project() {
        let f = fixture(0, 50).await;
        let catalog = ProjectCatalogUseCase::new(f.store.clone(), f.store.clone(), f.config.clone());

        let project = assert_ok!(catalog.add(f.owner, listing(5)).await);
        assert_eq!(project.title, "Chess engine");
        assert_eq!(project.screenshots.len(), 5);
        assert_eq!(project.purchase_count, 0);

        let owned = catalog.list_by_owner(&f.owner).await.unwrap();
        assert_eq!(owned.len(), 2);
        assert_eq!(catalog.list().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_add_project_validation() {
        let f = fixture(0, 50).await;
        let catalog = ProjectCatalogUseCase::new(f.store.clone(), f.store.clone(), f.config.clone());

        let err = assert_err!(catalog.add(f.owner, listing(6)).await);
        assert!(matches!(err, MarketError::Validation(_)));

        let mut free = listing(0);
        free.price = Money::ZERO;
        let err = assert_err!(catalog.add(f.owner, free).await);
        assert!(matches!(err, MarketError::InvalidAmount(_)));

        let mut untitled = listing(0);
        untitled.title = "   ".to_string();
        let err = assert_err!(catalog.add(f.owner, untitled).await);
        assert!(matches!(err, MarketError::Validation(_)));
    }

    #[tokio::test]
    async fn test_source_unlocks_after_purchase() {
        let f = fixture(100, 50).await;
        let catalog = ProjectCatalogUseCase::new(f.store.clone(), f.store.clone(), f.config.clone());
        let project_id = f.project.project_id;

        let err = assert_err!(catalog.source(&project_id, &member(f.buyer)).await);
        assert!(matches!(err, MarketError::Forbidden(_)));

        assert_ok!(catalog.source(&project_id, &member(f.owner)).await);
        assert_ok!(catalog.source(&project_id, &admin(AccountId::new())).await);

        SettleUseCase::new(f.store.clone(), f.store.clone(), f.config.clone())
            .execute(SettleInput {
                project_id,
                buyer_id: f.buyer,
                amount: money(50),
                commission: None,
                status: TransactionStatus::Successful,
            })
            .await
            .unwrap();

        let url = assert_ok!(catalog.source(&project_id, &member(f.buyer)).await);
        assert_eq!(url, "https://files.example/kanban.zip");

        let purchased = catalog.list_purchased(&f.buyer).await.unwrap();
        assert_eq!(purchased.len(), 1);
        assert_eq!(purchased[0].project_id, project_id);
    }

    #[tokio::test]
    async fn test_failed_purchase_does_not_unlock() {
        let f = fixture(100, 50).await;
        let catalog = ProjectCatalogUseCase::new(f.store.clone(), f.store.clone(), f.config.clone());

        SettleUseCase::new(f.store.clone(), f.store.clone(), f.config.clone())
            .execute(SettleInput {
                project_id: f.project.project_id,
                buyer_id: f.buyer,
                amount: money(50),
                commission: None,
                status: TransactionStatus::Failed,
            })
            .await
            .unwrap();

        assert_err!(catalog.source(&f.project.project_id, &member(f.buyer)).await);
        assert!(catalog.list_purchased(&f.buyer).await.unwrap().is_empty());
    }
}

#[cfg(test)]
mod feedback_tests {
    use kernel::id::{AccountId, FeedbackId, ProjectId};
    use tokio_test::{assert_err, assert_ok};

    use super::support::{admin, fixture, member};
    use crate::application::FeedbackUseCase;
    use crate::error::MarketError;

    #[tokio::test]
    async fn test_feedback_lifecycle() {
        let f = fixture(0, 50).await;
        let use_case = FeedbackUseCase::new(f.store.clone(), f.store.clone());
        let author = member(f.buyer);

        let feedback = assert_ok!(
            use_case
                .add(&author, f.project.project_id, 4, " Solid code ".to_string())
                .await
        );
        assert_eq!(feedback.rating.stars(), 4);
        assert_eq!(feedback.comment, "Solid code");

        let edited = assert_ok!(
            use_case
                .edit(&author, &feedback.feedback_id, Some(5), None)
                .await
        );
        assert_eq!(edited.rating.stars(), 5);
        assert_eq!(edited.comment, "Solid code");

        let listed = use_case.list_by_project(&f.project.project_id).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].rating.stars(), 5);

        assert_ok!(use_case.delete(&author, &feedback.feedback_id).await);
        let err = assert_err!(use_case.delete(&author, &feedback.feedback_id).await);
        assert!(matches!(err, MarketError::FeedbackNotFound));
    }

    #[tokio::test]
    async fn test_feedback_permissions() {
        let f = fixture(0, 50).await;
        let use_case = FeedbackUseCase::new(f.store.clone(), f.store.clone());
        let feedback = use_case
            .add(&member(f.buyer), f.project.project_id, 3, "Fine".to_string())
            .await
            .unwrap();

        let stranger = member(AccountId::new());
        let err = assert_err!(
            use_case
                .edit(&stranger, &feedback.feedback_id, Some(1), None)
                .await
        );
        assert!(matches!(err, MarketError::Forbidden(_)));
        let err = assert_err!(use_case.delete(&stranger, &feedback.feedback_id).await);
        assert!(matches!(err, MarketError::Forbidden(_)));

        // Admins moderate but do not edit
        let moderator = admin(AccountId::new());
        assert_err!(
            use_case
                .edit(&moderator, &feedback.feedback_id, Some(1), None)
                .await
        );
        assert_ok!(use_case.delete(&moderator, &feedback.feedback_id).await);
    }

    #[tokio::test]
    async fn test_feedback_validation() {
        let f = fixture(0, 50).await;
        let use_case = FeedbackUseCase::new(f.store.clone(), f.store.clone());
        let author = member(f.buyer);

        for rating in [0, 6] {
            let err = assert_err!(
                use_case
                    .add(&author, f.project.project_id, rating, "x".to_string())
                    .await
            );
            assert!(matches!(err, MarketError::Validation(_)));
        }

        let err = assert_err!(
            use_case
                .add(&author, ProjectId::new(), 5, "x".to_string())
                .await
        );
        assert!(matches!(err, MarketError::ProjectNotFound));

        let err = assert_err!(
            use_case
                .add(&author, f.project.project_id, 5, "a".repeat(2001))
                .await
        );
        assert!(matches!(err, MarketError::Validation(_)));

        let err = assert_err!(use_case.edit(&author, &FeedbackId::new(), None, None).await);
        assert!(matches!(err, MarketError::FeedbackNotFound));
    }
}

#[cfg(test)]
mod router_tests {
    use std::sync::Arc;

    use auth::{AccountRole, AuthConfig, TokenAuthority};
    use axum::Router;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use kernel::id::AccountId;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::support::{Fixture, fixture};
    use crate::application::config::MarketConfig;
    use crate::presentation::router::market_router_generic;

    struct TestApp {
        router: Router,
        authority: TokenAuthority,
        f: Fixture,
    }

    impl TestApp {
        fn token(&self, account_id: AccountId, role: AccountRole) -> String {
            self.authority.issue_pair(account_id, role).unwrap().access_token
        }
    }

    async fn app() -> TestApp {
        let f = fixture(100, 50).await;
        let auth_config = Arc::new(AuthConfig::development());
        let router = market_router_generic(
            (*f.store).clone(),
            auth_config.clone(),
            MarketConfig::new(f.platform),
        );
        TestApp {
            router,
            authority: TokenAuthority::new(auth_config),
            f,
        }
    }

    async fn call(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_public_listing_hides_source() {
        let app = app().await;

        let (status, body) = call(&app.router, request("GET", "/projects", None, None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"].as_array().unwrap().len(), 1);
        assert!(body["data"][0].get("sourceUrl").is_none());

        let uri = format!("/projects/{}", app.f.project.project_id);
        let (status, body) = call(&app.router, request("GET", &uri, None, None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["title"], "Kanban board");
        assert_eq!(body["data"]["purchaseCount"], 0);
    }

    #[tokio::test]
    async fn test_unknown_project_is_not_found() {
        let app = app().await;

        for uri in ["/projects/not-a-uuid", "/projects/00000000-0000-4000-8000-000000000000"] {
            let (status, body) = call(&app.router, request("GET", uri, None, None)).await;
            assert_eq!(status, StatusCode::NOT_FOUND);
            assert_eq!(body["message"], "Project not found");
        }
    }

    #[tokio::test]
    async fn test_purchase_requires_credential() {
        let app = app().await;
        let body = json!({ "projectId": app.f.project.project_id, "amount": "50" });

        let (status, _) = call(
            &app.router,
            request("POST", "/transactions", None, Some(body.clone())),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = call(
            &app.router,
            request("POST", "/transactions", Some("garbage"), Some(body)),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_purchase_then_download() {
        let app = app().await;
        let buyer = app.token(app.f.buyer, AccountRole::User);
        let source_uri = format!("/projects/{}/source", app.f.project.project_id);

        let (status, _) = call(&app.router, request("GET", &source_uri, Some(&buyer), None)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = call(
            &app.router,
            request(
                "POST",
                "/transactions",
                Some(&buyer),
                Some(json!({
                    "projectId": app.f.project.project_id,
                    "amount": "50",
                    "commission": "10"
                })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["data"]["status"], "successful");
        assert_eq!(body["data"]["buyerId"], app.f.buyer.to_string());

        let (status, body) = call(&app.router, request("GET", &source_uri, Some(&buyer), None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["sourceUrl"], "https://files.example/kanban.zip");

        let (status, body) = call(
            &app.router,
            request("GET", "/projects/purchased", Some(&buyer), None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_insufficient_funds_response() {
        let app = app().await;
        let poor = AccountId::new();
        app.f.store.set_balance(poor, kernel::money::Money::from_units(10)).await;
        let token = app.token(poor, AccountRole::User);

        let (status, body) = call(
            &app.router,
            request(
                "POST",
                "/transactions",
                Some(&token),
                Some(json!({ "projectId": app.f.project.project_id, "amount": "50" })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::PAYMENT_REQUIRED);
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Buyer does not have enough funds");
    }

    #[tokio::test]
    async fn test_unknown_status_on_create() {
        let app = app().await;
        let buyer = app.token(app.f.buyer, AccountRole::User);

        let (status, body) = call(
            &app.router,
            request(
                "POST",
                "/transactions",
                Some(&buyer),
                Some(json!({
                    "projectId": app.f.project.project_id,
                    "amount": "50",
                    "status": "pending"
                })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Invalid status");
    }

    #[tokio::test]
    async fn test_transaction_admin_routes() {
        let app = app().await;
        let member = app.token(app.f.buyer, AccountRole::User);
        let admin = app.token(AccountId::new(), AccountRole::Admin);

        let (status, _) = call(&app.router, request("GET", "/transactions", Some(&member), None)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = call(&app.router, request("GET", "/transactions", Some(&admin), None)).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["data"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_project_and_feedback() {
        let app = app().await;
        let seller = app.token(app.f.owner, AccountRole::User);

        let (status, body) = call(
            &app.router,
            request(
                "POST",
                "/projects",
                Some(&seller),
                Some(json!({
                    "title": "Chess engine",
                    "description": "Bitboard chess engine",
                    "shortDescription": "Chess",
                    "price": "25.50",
                    "sourceUrl": "https://files.example/chess.zip"
                })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["data"]["ownerId"], app.f.owner.to_string());
        assert!(body["data"].get("sourceUrl").is_none());

        let reviewer = app.token(app.f.buyer, AccountRole::User);
        let (status, body) = call(
            &app.router,
            request(
                "POST",
                "/feedback",
                Some(&reviewer),
                Some(json!({
                    "projectId": app.f.project.project_id,
                    "rating": 5,
                    "comment": "Great"
                })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let feedback_id = body["data"]["feedbackId"].as_str().unwrap().to_string();

        let uri = format!("/feedback/project/{}", app.f.project.project_id);
        let (status, body) = call(&app.router, request("GET", &uri, None, None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"][0]["rating"], 5);

        let uri = format!("/feedback/{feedback_id}");
        let (status, _) = call(&app.router, request("DELETE", &uri, Some(&seller), None)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = call(&app.router, request("DELETE", &uri, Some(&reviewer), None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Feedback deleted successfully.");
    }

    #[tokio::test]
    async fn test_price_beyond_money_range_is_client_error() {
        let app = app().await;
        let seller = app.token(app.f.owner, AccountRole::User);

        let (status, _) = call(
            &app.router,
            request(
                "POST",
                "/projects",
                Some(&seller),
                Some(json!({
                    "title": "Priceless",
                    "description": "Too expensive to store",
                    "shortDescription": "Huge",
                    "price": "100000000000000000",
                    "sourceUrl": "https://files.example/huge.zip"
                })),
            ),
        )
        .await;
        assert!(status.is_client_error(), "{status}");

        let (_, body) = call(&app.router, request("GET", "/projects", None, None)).await;
        assert_eq!(body["data"].as_array().unwrap().len(), 1);
    }
}

#[cfg(test)]
mod error_tests {
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use kernel::money::MoneyError;

    use crate::error::MarketError;

    #[test]
    fn test_error_into_response_status_codes() {
        let cases = vec![
            (MarketError::ProjectNotFound, StatusCode::NOT_FOUND),
            (MarketError::BuyerNotFound, StatusCode::NOT_FOUND),
            (MarketError::InsufficientFunds, StatusCode::PAYMENT_REQUIRED),
            (MarketError::PlatformAccountNotFound, StatusCode::NOT_FOUND),
            (MarketError::OwnerNotFound, StatusCode::NOT_FOUND),
            (MarketError::TransactionNotFound, StatusCode::NOT_FOUND),
            (MarketError::FeedbackNotFound, StatusCode::NOT_FOUND),
            (MarketError::InvalidStatus, StatusCode::BAD_REQUEST),
            (MarketError::InvalidAmount("x"), StatusCode::BAD_REQUEST),
            (MarketError::PriceMismatch, StatusCode::BAD_REQUEST),
            (MarketError::Forbidden("x"), StatusCode::FORBIDDEN),
            (MarketError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (MarketError::Internal("boom".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (
                MarketError::Database(sqlx::Error::RowNotFound),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(error.status_code(), expected);
            assert_eq!(error.into_response().status(), expected);
        }
    }

    #[test]
    fn test_messages() {
        assert_eq!(MarketError::PlatformAccountNotFound.to_string(), "Admin not found");
        assert_eq!(MarketError::FeedbackNotFound.to_string(), "Feedback not found.");
        assert_eq!(
            MarketError::Internal("pool exhausted".into()).to_app_error().message(),
            "Internal server error"
        );
    }

    #[test]
    fn test_money_errors() {
        assert_eq!(
            MarketError::from(MoneyError::Negative).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            MarketError::from(MoneyError::TooLarge).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            MarketError::from(MoneyError::Overflow).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}

#[cfg(test)]
mod schema_tests {
    const INIT_SQL: &str =
        include_str!("../../../../database/migrations/20250101000000_init.sql");

    fn table(name: &str) -> &'static str {
        let start = INIT_SQL
            .find(&format!("CREATE TABLE {name} ("))
            .unwrap_or_else(|| panic!("table {name} missing"));
        let len = INIT_SQL[start..].find(");").unwrap();
        &INIT_SQL[start..start + len]
    }

    fn reference_line(table_sql: &str, column: &str) -> String {
        table_sql
            .lines()
            .map(str::trim)
            .find(|line| line.starts_with(column) && line.contains("REFERENCES"))
            .unwrap_or_else(|| panic!("{column} has no foreign key"))
            .to_string()
    }

    #[test]
    fn test_transactions_outlive_their_references() {
        let transactions = table("transactions");
        assert!(!transactions.contains("CASCADE"), "{transactions}");
        assert!(reference_line(transactions, "project_id").contains("ON DELETE RESTRICT"));
        assert!(reference_line(transactions, "buyer_id").contains("ON DELETE RESTRICT"));
    }

    #[test]
    fn test_owner_with_listings_cannot_be_deleted() {
        let projects = table("projects");
        assert!(reference_line(projects, "owner_id").contains("ON DELETE RESTRICT"));
    }

    #[test]
    fn test_money_columns_match_money_bounds() {
        for (name, column) in [
            ("accounts", "wallet_balance"),
            ("projects", "price"),
            ("transactions", "amount"),
            ("transactions", "commission"),
        ] {
            let line = table(name)
                .lines()
                .map(str::trim)
                .find(|line| line.starts_with(column))
                .unwrap_or_else(|| panic!("{name}.{column} missing"));
            assert!(line.contains("NUMERIC(18, 2)"), "{name}.{column}: {line}");
        }
    }
}
