use super::{acquire, LockError, LockMode};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::{Duration, Instant};
use docfill_testkit::temp_dir_in_workspace;

#[test]
fn test_acquire_creates_lock_file_and_parents() {
    let temp_dir = temp_dir_in_workspace();
    let lock_path = temp_dir.path().join("nested/dir/catalog.lock");

    let guard = acquire(&lock_path, LockMode::Exclusive, Duration::from_secs(1)).unwrap();
    assert!(lock_path.exists());
    assert_eq!(guard.path(), lock_path);
    assert_eq!(guard.mode(), LockMode::Exclusive);
}

#[test]
fn test_exclusive_lock_times_out_while_held() {
    let temp_dir = temp_dir_in_workspace();
    let lock_path = temp_dir.path().join("catalog.lock");

    let _held = acquire(&lock_path, LockMode::Exclusive, Duration::from_secs(1)).unwrap();

    let start = Instant::now();
    let result = acquire(&lock_path, LockMode::Exclusive, Duration::from_millis(150));
    assert!(matches!(result, Err(LockError::Timeout { .. })));
    assert!(start.elapsed() >= Duration::from_millis(150));
}

#[test]
fn test_shared_locks_coexist() {
    let temp_dir = temp_dir_in_workspace();
    let lock_path = temp_dir.path().join("catalog.lock");

    let _first = acquire(&lock_path, LockMode::Shared, Duration::from_secs(1)).unwrap();
    let second = acquire(&lock_path, LockMode::Shared, Duration::from_millis(200));
    assert!(second.is_ok());
}

#[test]
fn test_shared_lock_blocks_writer() {
    let temp_dir = temp_dir_in_workspace();
    let lock_path = temp_dir.path().join("catalog.lock");

    let _reader = acquire(&lock_path, LockMode::Shared, Duration::from_secs(1)).unwrap();
    let writer = acquire(&lock_path, LockMode::Exclusive, Duration::from_millis(100));
    assert!(matches!(writer, Err(LockError::Timeout { .. })));
}

#[test]
fn test_lock_released_on_drop() {
    let temp_dir = temp_dir_in_workspace();
    let lock_path = temp_dir.path().join("catalog.lock");

    let guard = acquire(&lock_path, LockMode::Exclusive, Duration::from_secs(1)).unwrap();
    drop(guard);

    assert!(acquire(&lock_path, LockMode::Exclusive, Duration::from_millis(100)).is_ok());
}

#[test]
fn test_waiter_acquires_after_release() {
    let temp_dir = temp_dir_in_workspace();
    let lock_path = temp_dir.path().join("catalog.lock");
    let barrier = Arc::new(Barrier::new(2));

    let holder_path = lock_path.clone();
    let holder_barrier = barrier.clone();
    let holder = thread::spawn(move || {
        let _guard = acquire(&holder_path, LockMode::Exclusive, Duration::from_secs(1)).unwrap();
        holder_barrier.wait();
        thread::sleep(Duration::from_millis(100));
    });

    barrier.wait();
    let waiter = acquire(&lock_path, LockMode::Exclusive, Duration::from_secs(5));
    assert!(waiter.is_ok());

    holder.join().unwrap();
}
