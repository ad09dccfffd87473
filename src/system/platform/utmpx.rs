use std::sync::Mutex;

// getutxent walks a process-global cursor.
static UTMPX_CURSOR: Mutex<()> = Mutex::new(());

/// Count `USER_PROCESS` records in the login accounting database.
pub fn count_user_sessions() -> Option<usize> {
    let _guard = UTMPX_CURSOR.lock().ok()?;
    let mut count = 0;
    unsafe {
        libc::setutxent();
        loop {
            let entry = libc::getutxent();
            if entry.is_null() {
                break;
            }
            if (*entry).ut_type == libc::USER_PROCESS {
                count += 1;
            }
        }
        libc::endutxent();
    }
    Some(count)
}
