//! Operator smoke check: logs in, loads the first page of every screen and
//! the dashboard counters, and logs what came back.

use std::env;
use std::rc::Rc;

use dotenvy::dotenv;

use staymate_admin::DEFAULT_CONFIG_FILE;
use staymate_admin::api::SessionProvider;
use staymate_admin::api::http::HttpAdminApi;
use staymate_admin::forms::login::LoginForm;
use staymate_admin::models::config::AdminConfig;
use staymate_admin::services::dashboard::load_dashboard;
use staymate_admin::services::kyc::KycScreen;
use staymate_admin::services::list::FetchOutcome;
use staymate_admin::services::locations::LocationsScreen;
use staymate_admin::services::notifications::{Notifier, level_to_str};
use staymate_admin::services::questions::QuestionsScreen;
use staymate_admin::services::users::UsersScreen;
use staymate_admin::session::{FileSessionStorage, SessionGate};

fn flush(notifier: &Notifier) {
    for notification in notifier.drain() {
        log::info!(
            "[{}] {}",
            level_to_str(notification.level),
            notification.message
        );
    }
}

fn report(screen: &str, outcome: FetchOutcome, total: usize) -> bool {
    match outcome {
        FetchOutcome::Applied => {
            log::info!("{screen}: {total} total");
            true
        }
        other => {
            log::error!("{screen}: fetch ended as {other:?}");
            false
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    dotenv().ok(); // Load .env file
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config_file =
        env::var("STAYMATE_ADMIN_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
    let config = match AdminConfig::load(&config_file) {
        Ok(config) => config,
        Err(err) => {
            log::error!("Error loading admin config: {err}");
            std::process::exit(1);
        }
    };

    let notifier = Notifier::new();
    let gate = Rc::new(SessionGate::restore(
        FileSessionStorage::new(&config.session_file),
        notifier.clone(),
    ));
    let provider: Rc<dyn SessionProvider> = gate.clone();

    let api = match HttpAdminApi::from_config(&config, provider) {
        Ok(api) => Rc::new(api),
        Err(err) => {
            log::error!("Error building API client: {err}");
            std::process::exit(1);
        }
    };

    if !gate.is_authenticated() {
        let phone = match env::var("STAYMATE_ADMIN_PHONE") {
            Ok(phone) => phone,
            Err(_) => {
                log::error!("No stored session and STAYMATE_ADMIN_PHONE is not set");
                std::process::exit(1);
            }
        };
        if let Err(err) = gate.login(api.as_ref(), LoginForm { phone }).await {
            flush(&notifier);
            log::error!("Login failed: {err}");
            std::process::exit(1);
        }
    }
    flush(&notifier);

    let users =
        UsersScreen::with_page_size(Rc::clone(&api), notifier.clone(), config.users_page_size);
    let kyc = KycScreen::with_page_size(Rc::clone(&api), notifier.clone(), config.kyc_page_size);
    let questions = QuestionsScreen::new(Rc::clone(&api), notifier.clone());
    let locations = LocationsScreen::with_page_size(
        Rc::clone(&api),
        notifier.clone(),
        config.locations_page_size,
    );

    let mut healthy = true;
    healthy &= report("users", users.load().await, users.list().total());
    healthy &= report("kyc", kyc.load().await, kyc.list().total());
    healthy &= report("questions", questions.load().await, questions.list().total());
    healthy &= report("locations", locations.load().await, locations.list().total());

    match load_dashboard(api.as_ref(), &notifier).await {
        Ok(stats) => log::info!("stats: users={} kyc={}", stats.users, stats.kyc),
        Err(err) => {
            log::error!("stats: {err}");
            healthy = false;
        }
    }
    flush(&notifier);

    if !healthy {
        std::process::exit(1);
    }
}
