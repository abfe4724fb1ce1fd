// self
use crate::obs::{CallKind, CallOutcome};

/// Records a call outcome via the global metrics recorder (when enabled).
pub fn record_call_outcome(kind: CallKind, outcome: CallOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"jsonapi_auth_client_call_total",
			"call" => kind.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, outcome);
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn record_call_outcome_noop_without_metrics() {
		record_call_outcome(CallKind::Refresh, CallOutcome::Failure);
	}

	#[cfg(feature = "metrics")]
	#[test]
	fn record_call_outcome_increments_labeled_counter() {
		// crates.io
		use metrics::{
			Counter, CounterFn, Gauge, Histogram, Key, KeyName, Metadata, Recorder, SharedString,
			Unit,
		};
		// self
		use crate::_prelude::*;

		type Hits = Arc<Mutex<Vec<(String, Vec<(String, String)>, u64)>>>;

		struct Hit {
			key: Key,
			hits: Hits,
		}
		impl CounterFn for Hit {
			fn increment(&self, value: u64) {
				let labels = self
					.key
					.labels()
					.map(|label| (label.key().to_owned(), label.value().to_owned()))
					.collect();

				self.hits.lock().push((self.key.name().to_owned(), labels, value));
			}

			fn absolute(&self, _value: u64) {}
		}

		#[derive(Default)]
		struct Capture(Hits);
		impl Recorder for Capture {
			fn describe_counter(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}

			fn describe_gauge(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}

			fn describe_histogram(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}

			fn register_counter(&self, key: &Key, _: &Metadata<'_>) -> Counter {
				Counter::from_arc(Arc::new(Hit { key: key.clone(), hits: self.0.clone() }))
			}

			fn register_gauge(&self, _: &Key, _: &Metadata<'_>) -> Gauge {
				Gauge::noop()
			}

			fn register_histogram(&self, _: &Key, _: &Metadata<'_>) -> Histogram {
				Histogram::noop()
			}
		}

		let recorder = Capture::default();

		metrics::with_local_recorder(&recorder, || {
			record_call_outcome(CallKind::Logout, CallOutcome::Success);
		});

		assert_eq!(
			recorder.0.lock().as_slice(),
			[(
				"jsonapi_auth_client_call_total".to_owned(),
				vec![
					("call".to_owned(), "logout".to_owned()),
					("outcome".to_owned(), "success".to_owned()),
				],
				1,
			)]
		);
	}
}
