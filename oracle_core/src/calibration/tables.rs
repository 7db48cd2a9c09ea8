/// Shape of the smooth stencil: `amplitude * exp(-(x - mean)^2 / (2 std_dev^2)) + drift * x`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmoothShape {
    pub len: usize,
    pub amplitude: f64,
    pub mean: f64,
    pub std_dev: f64,
    pub drift: f64,
}

impl SmoothShape {
    pub fn weight(&self, x: usize) -> f64 {
        let x = x as f64;
        let exp_part = -((x - self.mean).powi(2)) / (2.0 * self.std_dev.powi(2));
        self.amplitude * exp_part.exp() + self.drift * x
    }
}

/// A versioned set of calibrated tables
#[derive(Debug, Clone, Copy)]
pub struct Calibration {
    pub version: &'static str,
    /// Range of data the tables were tuned against
    pub tuned_from: &'static str,
    pub tuned_to: &'static str,
    /// Earliest UTC date the tables are trusted for (YYYY-MM-DD)
    pub supported_since: &'static str,
    /// Histogram bins holding round native-unit amounts (1k sats ... 1 coin)
    pub round_unit_bins: &'static [usize],
    /// (stencil offset, weight) of the popular round-USD amounts
    pub spike_weights: &'static [(usize, f64)],
    pub smooth: SmoothShape,
    /// Histogram bin that holds 0.001 native units
    pub center_bin: usize,
    /// USD value the center bin represents at slide 0
    pub center_usd: f64,
}

impl Calibration {
    pub fn stencil_len(&self) -> usize {
        self.smooth.len
    }

    pub fn spike_stencil(&self) -> Vec<f64> {
        let mut spike = vec![0.0; self.smooth.len];
        for &(offset, weight) in self.spike_weights {
            spike[offset] = weight;
        }
        spike
    }

    pub fn smooth_stencil(&self) -> Vec<f64> {
        (0..self.smooth.len).map(|x| self.smooth.weight(x)).collect()
    }
}

const ROUND_UNIT_BINS: [usize; 18] = [
    201,  // 1k sats
    401,  // 10k
    461,  // 20k
    496,  // 30k
    540,  // 50k
    601,  // 100k
    661,  // 200k
    696,  // 300k
    740,  // 500k
    801,  // 0.01
    861,  // 0.02
    896,  // 0.03
    940,  // 0.04
    1001, // 0.1
    1061, // 0.2
    1096, // 0.3
    1140, // 0.5
    1201, // 1.0
];

const SPIKE_WEIGHTS: [(usize, f64); 29] = [
    (40, 0.001300198324984352),  // $1
    (141, 0.001676746949820743), // $5
    (201, 0.003468805546942046), // $10
    (202, 0.001991977522512513),
    (236, 0.001905066647961839), // $15
    (261, 0.003341772718156079), // $20
    (262, 0.002588902624584287),
    (296, 0.002577893841190244), // $30
    (297, 0.002733728814200412),
    (340, 0.003076117748975647), // $50
    (341, 0.005613067550103145),
    (342, 0.003088253178535568),
    (400, 0.002918457489366139), // $100
    (401, 0.006174500465286022),
    (402, 0.004417068070043504),
    (403, 0.002628663628020371),
    (436, 0.002858828161543839), // $150
    (461, 0.004097463611984264), // $200
    (462, 0.003345917406120509),
    (496, 0.002521467726855856), // $300
    (497, 0.002784125730361008),
    (541, 0.003792850444811335), // $500
    (601, 0.003688240815848247), // $1000
    (602, 0.002392400117402263),
    (636, 0.001280993059008106), // $1500
    (661, 0.001654665137536031), // $2000
    (662, 0.001395501347054946),
    (741, 0.001154279140906312), // $5000
    (801, 0.000832244504868709), // $10000
];

pub static CURRENT: Calibration = Calibration {
    version: "2024.12",
    tuned_from: "2020-01-01",
    tuned_to: "2024-12-31",
    supported_since: "2023-12-15",
    round_unit_bins: &ROUND_UNIT_BINS,
    spike_weights: &SPIKE_WEIGHTS,
    smooth: SmoothShape {
        len: 803,
        amplitude: 0.0015,
        mean: 411.0,
        std_dev: 201.0,
        drift: 0.0000005,
    },
    center_bin: 601,
    center_usd: 100.0,
};
