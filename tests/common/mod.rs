use std::thread;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use reno_transfer::host::Link;
use reno_transfer::sender::TransferStats;
use reno_transfer::{receiver, sender, Receiver, Sender};

pub fn random_file(len: usize, seed: u64) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..len).map(|_| rng.gen()).collect()
}

pub fn fast_sender_config() -> sender::Config {
    sender::Config {
        rto_ms: 20,
        ack_wait_ms: 2,
        tick_interval_us: 100,
        ..Default::default()
    }
}

pub fn patient_receiver_config() -> receiver::Config {
    receiver::Config {
        poll_ms: 50,
        grace_ms: 500,
    }
}

/// Runs a sender and a receiver on their own threads and returns what the receiver wrote.
pub fn transfer<A, B>(
    data: Vec<u8>,
    sender_link: A,
    receiver_link: B,
    sender_config: sender::Config,
    receiver_config: receiver::Config,
) -> (Vec<u8>, TransferStats)
where
    A: Link + Send + 'static,
    B: Link + Send + 'static,
{
    let receiver_thread = thread::spawn(move || {
        let receiver =
            Receiver::new_with_config(Vec::<u8>::new(), receiver_link, receiver_config);
        let (output, _stats) = receiver.run().expect("receiver failed");
        output
    });

    let sender_thread = thread::spawn(move || {
        let sender = Sender::new_with_config(data, sender_link, sender_config);
        sender.run().expect("sender failed")
    });

    let stats = sender_thread.join().unwrap();
    let output = receiver_thread.join().unwrap();

    (output, stats)
}
