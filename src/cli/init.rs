use crate::db::{get_connection, init_db};
use crate::error::Result;
use crate::settings::{load_settings, save_settings, shellexpand_path};

pub fn run(data_dir: Option<String>, user_name: Option<String>) -> Result<()> {
    let mut settings = load_settings();
    if let Some(dir) = data_dir {
        settings.data_dir = shellexpand_path(&dir);
    }
    if let Some(name) = user_name {
        settings.user_name = name.trim().to_string();
    }
    save_settings(&settings)?;

    let resolved = settings.data_path();
    std::fs::create_dir_all(resolved.join("models"))?;

    let conn = get_connection(&settings.db_path())?;
    init_db(&conn)?;

    println!("Initialized moneymind at {}", resolved.display());
    Ok(())
}
