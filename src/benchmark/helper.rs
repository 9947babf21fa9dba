use std::{
    fs::{self, File, Permissions},
    os::unix::prelude::PermissionsExt,
    path::Path,
};

use csv::Writer;

pub fn create_writer(path: &Path) -> Result<Writer<File>, std::io::Error> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let f = File::create(path)?;
    f.set_permissions(Permissions::from_mode(0o664))?;

    Ok(Writer::from_writer(f))
}
