use esshub_services::AuthService;
use esshub_services::dao::{DeviceDao, EmployeeDao, ShiftTypeDao, UserDao};
use serde_json::Value;

use super::test_app::TestApp;

/// A seeded login with a matching employee record, already authenticated.
pub struct SeededEmployee {
    pub email: String,
    pub employee_id: String,
    pub access_token: String,
}

/// A seeded admin login (no employee record).
pub struct SeededAdmin {
    pub email: String,
    pub access_token: String,
}

impl TestApp {
    /// Create a user + employee pair and log them in over HTTP.
    pub async fn seed_employee(&self, email: &str, name: &str) -> SeededEmployee {
        let password = "Password123!";
        self.create_user(email, name, password, vec![]).await;

        let employee = EmployeeDao::new(&self.db)
            .create(
                email.to_string(),
                name.to_string(),
                Some("Operations".to_string()),
                "Test Co".to_string(),
            )
            .await
            .expect("Failed to seed employee");

        SeededEmployee {
            email: email.to_string(),
            employee_id: employee.id.unwrap().to_hex(),
            access_token: self.login(email, password).await,
        }
    }

    /// Create a user holding an admin role and log them in.
    pub async fn seed_admin(&self, email: &str, role: &str) -> SeededAdmin {
        let password = "Password123!";
        self.create_user(email, "Admin", password, vec![role.to_string()])
            .await;

        SeededAdmin {
            email: email.to_string(),
            access_token: self.login(email, password).await,
        }
    }

    pub async fn seed_device(&self, email: &str, token: &str) {
        DeviceDao::new(&self.db)
            .register(email, Some(token))
            .await
            .expect("Failed to seed device");
    }

    pub async fn seed_shift_type(&self, name: &str) {
        ShiftTypeDao::new(&self.db)
            .create(name.to_string())
            .await
            .expect("Failed to seed shift type");
    }

    async fn create_user(&self, email: &str, name: &str, password: &str, roles: Vec<String>) {
        let auth = AuthService::new(self.settings.jwt.clone());
        let hash = auth
            .hash_password(password)
            .expect("Failed to hash password");
        UserDao::new(&self.db)
            .create(email.to_string(), name.to_string(), Some(hash), roles)
            .await
            .expect("Failed to seed user");
    }

    async fn login(&self, email: &str, password: &str) -> String {
        let resp = self
            .client
            .post(self.url("/api/auth/login"))
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await
            .expect("Login request failed");
        assert_eq!(resp.status().as_u16(), 200, "Login failed for {email}");

        let json: Value = resp.json().await.expect("Failed to parse login response");
        json["access_token"]
            .as_str()
            .expect("Missing access token")
            .to_string()
    }
}
