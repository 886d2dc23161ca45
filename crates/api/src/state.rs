use esshub_config::Settings;
use esshub_services::{
    AuthService, PushService, SchemaRegistry,
    cache::{RuleCache, SchemaCache},
    dao::{
        attendance_request::AttendanceRequestDao, employee::EmployeeDao,
        device::DeviceDao, shift_type::ShiftTypeDao, user::UserDao,
    },
    notify::{FcmClient, NotificationEngine, WebhookRelay},
};
use mongodb::Database;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub settings: Settings,
    pub auth: Arc<AuthService>,
    pub users: Arc<UserDao>,
    pub employees: Arc<EmployeeDao>,
    pub devices: Arc<DeviceDao>,
    pub attendance: Arc<AttendanceRequestDao>,
    pub shift_types: Arc<ShiftTypeDao>,
    pub schema: Arc<SchemaRegistry>,
    pub engine: Arc<NotificationEngine>,
    pub push: Arc<PushService>,
}

impl AppState {
    pub fn new(db: Database, settings: Settings) -> Self {
        let auth = Arc::new(AuthService::new(settings.jwt.clone()));
        let users = Arc::new(UserDao::new(&db));
        let employees = Arc::new(EmployeeDao::new(&db));
        let devices = Arc::new(DeviceDao::new(&db));
        let attendance = Arc::new(AttendanceRequestDao::new(&db));
        let shift_types = Arc::new(ShiftTypeDao::new(&db));

        let schema_cache = Arc::new(SchemaCache::new());
        let rule_cache = Arc::new(RuleCache::new());
        let schema = Arc::new(SchemaRegistry::new(&db, schema_cache));

        let fcm = Arc::new(FcmClient::new(&settings.push));
        let webhook = Arc::new(WebhookRelay::new(&settings.webhook, &settings.app));
        let engine = Arc::new(NotificationEngine::new(
            &db,
            &settings.notifications,
            Arc::clone(&schema),
            rule_cache,
            Arc::clone(&fcm),
            webhook,
        ));
        let push = Arc::new(PushService::new(&db, fcm));

        Self {
            db,
            settings,
            auth,
            users,
            employees,
            devices,
            attendance,
            shift_types,
            schema,
            engine,
            push,
        }
    }
}
