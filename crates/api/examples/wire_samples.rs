//! Generate wire samples for backend interop checking.
//!
//! Run with: cargo run --package api --example wire_samples

use api::models::*;

fn main() {
    // Sample 1: a stored file record
    let file = FileInfo {
        id: 42,
        name: "holiday.mp4".to_string(),
        file_type: FileKind::Video,
        size: 104_857_600,
        created_at: "2024-11-02T09:30:00Z".parse().unwrap(),
    };
    print_sample("file_info", &file);

    // Sample 2: one page of the file listing
    let page = FileInfoPage {
        content: vec![file],
        total_elements: 13,
        total_pages: 2,
        number: 0,
        size: 10,
    };
    print_sample("file_info_page", &page);

    // Sample 3: a user record
    let user = UserInfo {
        id: 3,
        email: "admin@example.com".to_string(),
        role: "ADMIN".to_string(),
        credits: 500,
    };
    print_sample("user_info", &user);

    // Sample 4: login response
    let login = LoginData {
        token: "header.payload.signature".to_string(),
    };
    print_sample("login_data", &login);

    // Sample 5: registration request
    let register = RegisterRequest {
        email: "new@example.com".to_string(),
        password: "hunter2".to_string(),
    };
    print_sample("register_request", &register);

    // Sample 6: credit assignment request
    let assign = AssignRequest {
        amount: 100,
        description: "monthly top-up".to_string(),
    };
    print_sample("assign_request", &assign);
}

fn print_sample<T: serde::Serialize>(name: &str, value: &T) {
    println!("=== {name} ===");
    println!("{}", serde_json::to_string_pretty(value).unwrap());
    println!();
}
