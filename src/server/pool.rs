//! # Pool de Workers
//! src/server/pool.rs
//!
//! Número fijo de threads que consumen una cola FIFO compartida
//! (`Mutex<VecDeque>` + `Condvar`). Cada item lo procesa un solo worker de
//! principio a fin.
//!
//! La cola es ilimitada salvo que se indique una capacidad: en ese caso
//! `submit` devuelve el item al llamador cuando la cola está llena, para que
//! decida qué hacer con él (backpressure).

use std::collections::VecDeque;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};

/// La cola estaba llena; el item vuelve al llamador
#[derive(Debug)]
pub struct QueueFull<T>(pub T);

struct QueueState<T> {
    items: VecDeque<T>,
    shutting_down: bool,
}

struct Shared<T> {
    state: Mutex<QueueState<T>>,
    available: Condvar,
}

impl<T> Shared<T> {
    // Un worker que entró en pánico no invalida la cola
    fn lock(&self) -> MutexGuard<'_, QueueState<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Pool de tamaño fijo
pub struct WorkerPool<T: Send + 'static> {
    shared: Arc<Shared<T>>,
    workers: Vec<JoinHandle<()>>,
    capacity: usize,
}

impl<T: Send + 'static> WorkerPool<T> {
    /// Crea el pool e inicia `size` workers.
    ///
    /// `capacity = 0` significa cola sin límite.
    pub fn new<F>(size: usize, capacity: usize, handler: F) -> io::Result<Self>
    where
        F: Fn(T) + Send + Sync + 'static,
    {
        if size == 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "worker pool needs at least one worker",
            ));
        }

        let shared = Arc::new(Shared {
            state: Mutex::new(QueueState {
                items: VecDeque::new(),
                shutting_down: false,
            }),
            available: Condvar::new(),
        });
        let handler = Arc::new(handler);

        let mut pool = Self {
            shared,
            workers: Vec::with_capacity(size),
            capacity,
        };
        for id in 0..size {
            let shared = Arc::clone(&pool.shared);
            let handler = Arc::clone(&handler);
            let name = format!("worker-{}", id);
            // Si falla un spawn, el Drop del pool detiene los workers ya creados
            let worker = thread::Builder::new()
                .name(name.clone())
                .spawn(move || worker_loop(name, shared, handler))?;
            pool.workers.push(worker);
        }
        Ok(pool)
    }

    /// Encola un item para el próximo worker libre
    pub fn submit(&self, item: T) -> Result<(), QueueFull<T>> {
        let mut state = self.shared.lock();
        if self.capacity > 0 && state.items.len() >= self.capacity {
            return Err(QueueFull(item));
        }
        state.items.push_back(item);
        drop(state);

        self.shared.available.notify_one();
        Ok(())
    }

    /// Número de workers
    pub fn size(&self) -> usize {
        self.workers.len()
    }
}

impl<T: Send + 'static> Drop for WorkerPool<T> {
    /// Los workers terminan lo encolado y salen
    fn drop(&mut self) {
        self.shared.lock().shutting_down = true;
        self.shared.available.notify_all();

        for worker in self.workers.drain(..) {
            if worker.join().is_err() {
                tracing::error!("un worker terminó con pánico");
            }
        }
    }
}

fn worker_loop<T, F>(name: String, shared: Arc<Shared<T>>, handler: Arc<F>)
where
    F: Fn(T),
{
    tracing::debug!(worker = %name, "worker iniciado");

    loop {
        let item = {
            let mut state = shared.lock();
            loop {
                if let Some(item) = state.items.pop_front() {
                    break item;
                }
                if state.shutting_down {
                    tracing::debug!(worker = %name, "worker detenido");
                    return;
                }
                state = shared
                    .available
                    .wait(state)
                    .unwrap_or_else(PoisonError::into_inner);
            }
        };

        if panic::catch_unwind(AssertUnwindSafe(|| (*handler)(item))).is_err() {
            tracing::error!(worker = %name, "pánico procesando un item; el worker sigue activo");
        }
    }
}
