use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn aquaflow(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("aquaflow").unwrap();
    cmd.current_dir(dir.path()).env("AQUAFLOW_ROOT", dir.path());
    cmd
}

fn init_store(dir: &TempDir) {
    aquaflow(dir).arg("init").assert().success();
}

fn place_order(dir: &TempDir, pincode: &str) -> assert_cmd::assert::Assert {
    aquaflow(dir)
        .args([
            "order",
            "place",
            "--user",
            "u-1",
            "--product",
            "p1",
            "--quantity",
            "2",
            "--name",
            "Ravi Kumar",
            "--pincode",
            pincode,
            "--area",
            "Adyar",
            "--address",
            "12 Beach Road",
            "--phone",
            "9876543210",
            "--empty-can",
        ])
        .assert()
}

fn last_order_id(dir: &TempDir) -> String {
    std::fs::read_to_string(dir.path().join(".aquaflow/last-order"))
        .unwrap()
        .trim()
        .to_string()
}

// ---------------------------------------------------------------------------
// aquaflow init
// ---------------------------------------------------------------------------

#[test]
fn init_creates_directory_tree() {
    let dir = TempDir::new().unwrap();
    aquaflow(&dir).arg("init").assert().success();

    assert!(dir.path().join(".aquaflow").is_dir());
    assert!(dir.path().join(".aquaflow/orders").is_dir());
    assert!(dir.path().join(".aquaflow/users").is_dir());
    assert!(dir.path().join(".aquaflow/config.yaml").exists());
    assert!(dir.path().join(".aquaflow/products.yaml").exists());
    assert!(dir.path().join(".aquaflow/users/admin.yaml").exists());
}

#[test]
fn init_is_idempotent() {
    let dir = TempDir::new().unwrap();
    // Run twice — should succeed both times without error
    aquaflow(&dir).arg("init").assert().success();
    aquaflow(&dir).arg("init").assert().success();
}

// ---------------------------------------------------------------------------
// aquaflow products
// ---------------------------------------------------------------------------

#[test]
fn products_lists_builtin_catalog() {
    let dir = TempDir::new().unwrap();
    init_store(&dir);

    aquaflow(&dir)
        .arg("products")
        .assert()
        .success()
        .stdout(predicate::str::contains("20L Standard Water"))
        .stdout(predicate::str::contains("Rs.35"))
        .stdout(predicate::str::contains("20L Himalayan Spring"));
}

// ---------------------------------------------------------------------------
// aquaflow order place
// ---------------------------------------------------------------------------

#[test]
fn order_place_happy_path() {
    let dir = TempDir::new().unwrap();
    init_store(&dir);

    place_order(&dir, "600028")
        .success()
        .stdout(predicate::str::contains("Order placed: ORD-"))
        .stdout(predicate::str::contains("status: Placed"));

    let id = last_order_id(&dir);
    assert!(id.starts_with("ORD-"));
    assert_eq!(id.len(), 13);
    assert!(dir
        .path()
        .join(format!(".aquaflow/orders/{id}.yaml"))
        .exists());
}

#[test]
fn order_place_out_of_area_pincode_rejected() {
    let dir = TempDir::new().unwrap();
    init_store(&dir);

    place_order(&dir, "500001")
        .failure()
        .stderr(predicate::str::contains(
            "Sorry, we currently only deliver within Chennai.",
        ));

    // Nothing was persisted for the rejected order.
    let orders: Vec<_> = std::fs::read_dir(dir.path().join(".aquaflow/orders"))
        .unwrap()
        .collect();
    assert!(orders.is_empty());
}

#[test]
fn order_place_requires_consent_flag() {
    let dir = TempDir::new().unwrap();
    init_store(&dir);

    aquaflow(&dir)
        .args([
            "order", "place", "--user", "u-1", "--product", "p1", "--name", "Ravi",
            "--pincode", "600028", "--area", "Adyar", "--address", "12 Beach Road",
            "--phone", "9876543210",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("empty can"));
}

#[test]
fn order_place_unknown_product_rejected() {
    let dir = TempDir::new().unwrap();
    init_store(&dir);

    aquaflow(&dir)
        .args([
            "order", "place", "--user", "u-1", "--product", "p99", "--name", "Ravi",
            "--pincode", "600028", "--area", "Adyar", "--address", "12 Beach Road",
            "--phone", "9876543210", "--empty-can",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("product not found"));
}

#[test]
fn sixth_order_within_window_is_rate_limited() {
    let dir = TempDir::new().unwrap();
    init_store(&dir);

    for _ in 0..5 {
        place_order(&dir, "600028").success();
    }
    place_order(&dir, "600028")
        .failure()
        .stderr(predicate::str::contains("rate limit exceeded"));
}

// ---------------------------------------------------------------------------
// aquaflow order track / show / list
// ---------------------------------------------------------------------------

#[test]
fn track_unknown_order_fails() {
    let dir = TempDir::new().unwrap();
    init_store(&dir);

    aquaflow(&dir)
        .args(["order", "track", "ORD-MISSING00"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Order ID not found."));
}

#[test]
fn track_accepts_lowercase_input() {
    let dir = TempDir::new().unwrap();
    init_store(&dir);
    place_order(&dir, "600028").success();
    let id = last_order_id(&dir);

    aquaflow(&dir)
        .args(["order", "track", &id.to_lowercase()])
        .assert()
        .success()
        .stdout(predicate::str::contains("[>] Placed"))
        .stdout(predicate::str::contains("[ ] Delivered"));
}

#[test]
fn track_defaults_to_last_order() {
    let dir = TempDir::new().unwrap();
    init_store(&dir);
    place_order(&dir, "600028").success();
    let id = last_order_id(&dir);

    aquaflow(&dir)
        .args(["order", "track"])
        .assert()
        .success()
        .stdout(predicate::str::contains(&id));
}

#[test]
fn order_list_shows_placed_orders() {
    let dir = TempDir::new().unwrap();
    init_store(&dir);
    place_order(&dir, "600028").success();

    aquaflow(&dir)
        .args(["order", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ORD-"))
        .stdout(predicate::str::contains("Placed"));
}

// ---------------------------------------------------------------------------
// aquaflow order set-status
// ---------------------------------------------------------------------------

#[test]
fn set_status_moves_order_and_track_reflects_it() {
    let dir = TempDir::new().unwrap();
    init_store(&dir);
    place_order(&dir, "600028").success();
    let id = last_order_id(&dir);

    aquaflow(&dir)
        .args(["order", "set-status", &id, "out-for-delivery"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Out for Delivery"));

    aquaflow(&dir)
        .args(["order", "track", &id])
        .assert()
        .success()
        .stdout(predicate::str::contains("[x] Confirmed"))
        .stdout(predicate::str::contains("[>] Out for Delivery"));
}

#[test]
fn set_status_accepts_any_jump() {
    let dir = TempDir::new().unwrap();
    init_store(&dir);
    place_order(&dir, "600028").success();
    let id = last_order_id(&dir);

    // Straight to delivered, then back: the lifecycle order is display-only.
    aquaflow(&dir)
        .args(["order", "set-status", &id, "delivered"])
        .assert()
        .success();
    aquaflow(&dir)
        .args(["order", "set-status", &id, "placed"])
        .assert()
        .success();
}

#[test]
fn set_status_as_non_admin_is_refused() {
    let dir = TempDir::new().unwrap();
    init_store(&dir);
    place_order(&dir, "600028").success();
    let id = last_order_id(&dir);

    let signup = aquaflow(&dir)
        .args([
            "--json", "user", "signup", "--email", "ravi@example.com", "--username", "ravi",
            "--name", "Ravi Kumar", "--password", "s3cret",
        ])
        .assert()
        .success();
    let session: serde_json::Value =
        serde_json::from_slice(&signup.get_output().stdout).unwrap();
    let user_id = session["user_id"].as_str().unwrap();

    aquaflow(&dir)
        .args(["order", "set-status", &id, "delivered", "--as", user_id])
        .assert()
        .failure()
        .stderr(predicate::str::contains("admin role"));
}

#[test]
fn set_status_rejects_unknown_status() {
    let dir = TempDir::new().unwrap();
    init_store(&dir);
    place_order(&dir, "600028").success();
    let id = last_order_id(&dir);

    aquaflow(&dir)
        .args(["order", "set-status", &id, "shipped"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid order status"));
}

// ---------------------------------------------------------------------------
// aquaflow order bill
// ---------------------------------------------------------------------------

#[test]
fn bill_prints_invoice_totals() {
    let dir = TempDir::new().unwrap();
    init_store(&dir);
    place_order(&dir, "600028").success();

    // 2 x p1 @ Rs.35
    aquaflow(&dir)
        .args(["order", "bill"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Rs.70"))
        .stdout(predicate::str::contains("Cash on Delivery"));
}

// ---------------------------------------------------------------------------
// aquaflow user
// ---------------------------------------------------------------------------

#[test]
fn signup_then_login() {
    let dir = TempDir::new().unwrap();
    init_store(&dir);

    aquaflow(&dir)
        .args([
            "user", "signup", "--email", "ravi@example.com", "--username", "ravi",
            "--name", "Ravi Kumar", "--password", "s3cret",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Account 'ravi' created."));

    aquaflow(&dir)
        .args(["user", "login", "--username", "ravi", "--password", "s3cret"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Signed in as ravi (user)"));
}

#[test]
fn login_with_wrong_password_fails() {
    let dir = TempDir::new().unwrap();
    init_store(&dir);

    aquaflow(&dir)
        .args(["user", "login", "--username", "admin", "--password", "wrong"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("authentication failed"));
}

#[test]
fn seeded_admin_can_sign_in() {
    let dir = TempDir::new().unwrap();
    init_store(&dir);

    aquaflow(&dir)
        .args(["user", "login", "--username", "admin", "--password", "admin"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Signed in as admin (admin)"));
}

// ---------------------------------------------------------------------------
// aquaflow config
// ---------------------------------------------------------------------------

#[test]
fn config_validate_default_is_clean() {
    let dir = TempDir::new().unwrap();
    init_store(&dir);

    aquaflow(&dir)
        .args(["config", "validate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No warnings."));
}

#[test]
fn config_validate_flags_bad_prefix() {
    let dir = TempDir::new().unwrap();
    init_store(&dir);

    let config_path = dir.path().join(".aquaflow/config.yaml");
    let mut config = std::fs::read_to_string(&config_path).unwrap();
    config = config.replace("pincode_prefix: '600'", "pincode_prefix: ''");
    config = config.replace("pincode_prefix: \"600\"", "pincode_prefix: \"\"");
    std::fs::write(&config_path, config).unwrap();

    aquaflow(&dir)
        .args(["config", "validate"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("pincode_prefix"));
}

#[test]
fn commands_fail_before_init() {
    let dir = TempDir::new().unwrap();

    aquaflow(&dir)
        .args(["order", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not initialized"));
}
