#![forbid(unsafe_code)]

/// `embed_migrations!` is a proc-macro and cannot track the migration
/// directory by itself, so edits to `up.sql`/`down.sql` would not trigger a
/// rebuild without this hint.
fn main() {
    println!("cargo:rerun-if-changed=./migrations");
}
