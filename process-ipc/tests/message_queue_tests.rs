// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use mail_scan_process_ipc::message_queue::{
    is_removed, worker_topic, MessageQueue, COMPLETION_TOPIC, PAYLOAD_CAPACITY,
};
use std::thread;

#[test]
fn test_worker_topics_never_collide_with_completions() {
    // Act
    let topics: Vec<i64> = (0..4).map(worker_topic).collect();

    // Assert
    assert_eq!(topics, vec![2, 3, 4, 5]);
    assert!(!topics.contains(&COMPLETION_TOPIC));
}

#[test]
fn test_receive_only_takes_its_topic() {
    // Arrange
    let queue = MessageQueue::create().unwrap();
    queue.send(worker_topic(1), b"for one").unwrap();
    queue.send(worker_topic(0), b"for zero").unwrap();

    // Act
    let zero = queue.receive(worker_topic(0)).unwrap();
    let one = queue.receive(worker_topic(1)).unwrap();

    // Assert
    assert_eq!(zero, b"for zero");
    assert_eq!(one, b"for one");
    queue.remove().unwrap();
}

#[test]
fn test_messages_on_a_topic_keep_their_order() {
    // Arrange
    let queue = MessageQueue::create().unwrap();
    for payload in [&b"first"[..], b"second", b"third"] {
        queue.send(COMPLETION_TOPIC, payload).unwrap();
    }

    // Act
    let received: Vec<Vec<u8>> = (0..3)
        .map(|_| queue.receive(COMPLETION_TOPIC).unwrap())
        .collect();

    // Assert
    assert_eq!(received, vec![b"first".to_vec(), b"second".to_vec(), b"third".to_vec()]);
    queue.remove().unwrap();
}

#[test]
fn test_oversize_payload_is_rejected() {
    // Arrange
    let queue = MessageQueue::create().unwrap();
    let payload = vec![b'x'; PAYLOAD_CAPACITY + 1];

    // Act
    let result = queue.send(COMPLETION_TOPIC, &payload);

    // Assert
    assert_eq!(result.unwrap_err().kind(), std::io::ErrorKind::InvalidInput);
    queue.remove().unwrap();
}

#[test]
fn test_non_positive_topic_is_rejected() {
    // Arrange
    let queue = MessageQueue::create().unwrap();

    // Act
    let result = queue.send(0, b"nobody");

    // Assert
    assert!(result.is_err());
    queue.remove().unwrap();
}

#[test]
fn test_remove_wakes_blocked_receiver() {
    // Arrange
    let queue = MessageQueue::create().unwrap();
    let receiver = thread::spawn(move || queue.receive(COMPLETION_TOPIC));
    thread::sleep(std::time::Duration::from_millis(100));

    // Act
    queue.remove().unwrap();
    let result = receiver.join().unwrap();

    // Assert
    assert!(is_removed(&result.unwrap_err()));
}
