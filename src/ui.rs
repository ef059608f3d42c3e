use crate::ledger::Aggregates;
use crate::models::Booth;
use crate::money::Money;
use serde_json::json;

pub fn render_login(remembered_user: Option<&str>) -> String {
    let remembered = remembered_user.map(escape_html).unwrap_or_default();
    let checked = if remembered_user.is_some() { "checked" } else { "" };
    LOGIN_HTML
        .replace("{{CSS}}", BASE_CSS)
        .replace("{{REMEMBERED_USER}}", &remembered)
        .replace("{{REMEMBER_CHECKED}}", checked)
}

pub fn render_register() -> String {
    REGISTER_HTML.replace("{{CSS}}", BASE_CSS)
}

/// Full regeneration of the dashboard page from one aggregate snapshot. The
/// page is rebuilt on every load instead of patching rows in place, so the
/// tables can never drift from the aggregates.
pub fn render_dashboard(aggregates: &Aggregates) -> String {
    let dashboard = aggregates.project();

    let mut service_rows = String::new();
    for row in &dashboard.services {
        let remaining_class = if row.remaining < Money::ZERO { "neg" } else { "pos" };
        service_rows.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td class=\"{}\">{}</td><td class=\"tax\">{}</td></tr>\n",
            row.service,
            row.limit.grouped(),
            row.used,
            remaining_class,
            row.remaining,
            row.tax
        ));
    }

    let mut booth_rows = String::new();
    for row in &dashboard.booths {
        booth_rows.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            row.booth, row.location, row.revenue
        ));
    }

    let mut freq_rows = String::new();
    if dashboard.frequencies.is_empty() {
        freq_rows.push_str("<tr><td colspan=\"3\" class=\"empty\">No transactions yet</td></tr>\n");
    }
    for row in &dashboard.frequencies {
        freq_rows.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            row.booth, row.service, row.count
        ));
    }

    let mut services_per_booth = serde_json::Map::new();
    let mut booth_locations = serde_json::Map::new();
    for booth in Booth::ALL {
        let services: Vec<&str> = booth.services().iter().map(|service| service.name()).collect();
        services_per_booth.insert(booth.to_string(), json!(services));
        booth_locations.insert(booth.to_string(), json!(booth.location()));
    }

    let mut service_state = serde_json::Map::new();
    for row in &dashboard.services {
        service_state.insert(
            row.service.name().to_string(),
            json!({
                "limit": row.limit,
                "used": row.used,
                "remaining": row.remaining,
                "limit_label": row.limit.grouped(),
                "used_label": row.used.to_string(),
                "remaining_label": row.remaining.to_string(),
            }),
        );
    }

    let mut booth_revenue = serde_json::Map::new();
    for row in &dashboard.booths {
        booth_revenue.insert(row.booth.to_string(), json!(row.revenue.to_string()));
    }

    DASHBOARD_HTML
        .replace("{{CSS}}", BASE_CSS)
        .replace("{{SERVICE_ROWS}}", &service_rows)
        .replace("{{BOOTH_ROWS}}", &booth_rows)
        .replace("{{FREQ_ROWS}}", &freq_rows)
        .replace("{{TOTAL_REVENUE}}", &dashboard.total_revenue.as_kwacha().to_string())
        .replace("{{TOTAL_TAX}}", &dashboard.total_tax.as_kwacha().to_string())
        .replace("{{TOTAL_REVENUE_LABEL}}", &dashboard.total_revenue.to_string())
        .replace("{{TOTAL_TAX_LABEL}}", &dashboard.total_tax.to_string())
        .replace(
            "{{SERVICES_PER_BOOTH}}",
            &serde_json::Value::Object(services_per_booth).to_string(),
        )
        .replace(
            "{{BOOTH_LOCATIONS}}",
            &serde_json::Value::Object(booth_locations).to_string(),
        )
        .replace(
            "{{SERVICE_STATE}}",
            &serde_json::Value::Object(service_state).to_string(),
        )
        .replace(
            "{{BOOTH_REVENUE}}",
            &serde_json::Value::Object(booth_revenue).to_string(),
        )
}

fn escape_html(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

const BASE_CSS: &str = r#"
    :root {
      --bg-1: #eef6f1;
      --bg-2: #cde9da;
      --ink: #1f2d27;
      --accent: #059669;
      --accent-2: #2563eb;
      --danger: #dc2626;
      --card: rgba(255, 255, 255, 0.92);
      --shadow: 0 24px 60px rgba(6, 78, 59, 0.16);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: radial-gradient(circle at top, var(--bg-2), transparent 60%),
        linear-gradient(135deg, var(--bg-1), #e3f2ea 60%, #f2f9f5 100%);
      color: var(--ink);
      font-family: "Trebuchet MS", "Segoe UI", sans-serif;
      display: grid;
      place-items: center;
      padding: 32px 18px 48px;
    }

    .app {
      width: min(960px, 100%);
      background: var(--card);
      border-radius: 24px;
      box-shadow: var(--shadow);
      padding: 32px;
      display: grid;
      gap: 24px;
    }

    header h1 {
      margin: 0;
      font-size: clamp(1.6rem, 3vw, 2.2rem);
    }

    .subtitle {
      margin: 4px 0 0;
      color: #55675e;
      font-size: 0.95rem;
    }

    form {
      display: grid;
      gap: 14px;
    }

    label {
      display: grid;
      gap: 6px;
      font-size: 0.9rem;
      font-weight: 600;
    }

    input, select {
      padding: 10px 12px;
      border: 1px solid rgba(6, 78, 59, 0.2);
      border-radius: 10px;
      font-size: 1rem;
    }

    button {
      appearance: none;
      border: none;
      border-radius: 999px;
      padding: 12px 18px;
      font-size: 1rem;
      font-weight: 600;
      cursor: pointer;
      background: var(--accent);
      color: white;
    }

    button:active {
      transform: scale(0.98);
    }

    .remember {
      display: flex;
      align-items: center;
      gap: 8px;
      font-weight: 400;
    }

    .status {
      font-size: 0.95rem;
      min-height: 1.2em;
      color: #55675e;
    }

    .status[data-type="error"] {
      color: var(--danger);
    }

    .status[data-type="ok"] {
      color: var(--accent);
    }

    .hint {
      font-size: 0.9rem;
      color: #55675e;
    }

    .hint a {
      color: var(--accent-2);
    }

    table {
      width: 100%;
      border-collapse: collapse;
      background: white;
      border-radius: 14px;
      overflow: hidden;
    }

    th, td {
      padding: 10px 12px;
      text-align: left;
      border-bottom: 1px solid rgba(6, 78, 59, 0.08);
      font-size: 0.95rem;
    }

    th {
      background: rgba(6, 78, 59, 0.06);
      font-size: 0.85rem;
      text-transform: uppercase;
      letter-spacing: 0.08em;
    }

    td.pos { color: var(--accent); }
    td.neg { color: var(--danger); }
    td.tax { color: var(--danger); font-weight: 600; }
    td.empty { color: #8a978f; text-align: center; }

    .panel {
      background: white;
      border-radius: 18px;
      padding: 18px;
      border: 1px solid rgba(6, 78, 59, 0.08);
      display: grid;
      gap: 12px;
    }

    .panel h2 {
      margin: 0;
      font-size: 1.15rem;
    }

    .info {
      font-size: 0.92rem;
      color: #3c4a43;
      min-height: 1.2em;
    }

    .tax-bar {
      display: none;
      height: 12px;
      background: rgba(6, 78, 59, 0.1);
      border-radius: 999px;
      overflow: hidden;
    }

    .tax-bar-fill {
      height: 100%;
      width: 0;
      background: var(--danger);
      transition: width 600ms ease;
    }

    #revenuePie {
      max-width: 280px;
      margin: 0 auto;
      display: block;
    }

    .legend {
      display: flex;
      justify-content: center;
      gap: 18px;
      font-size: 0.9rem;
    }

    .legend .swatch {
      display: inline-block;
      width: 12px;
      height: 12px;
      border-radius: 3px;
      margin-right: 6px;
    }
"#;

const LOGIN_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Wina Bwangu — Login</title>
  <style>{{CSS}}</style>
</head>
<body>
  <main class="app" style="width: min(440px, 100%)">
    <header>
      <h1>Wina Bwangu</h1>
      <p class="subtitle">Mobile money booth management</p>
    </header>
    <form id="login-form">
      <label>Username
        <input type="text" id="username" value="{{REMEMBERED_USER}}" autocomplete="username" />
      </label>
      <label>Password
        <input type="password" id="password" autocomplete="current-password" />
      </label>
      <label class="remember">
        <input type="checkbox" id="remember" {{REMEMBER_CHECKED}} /> Remember me
      </label>
      <button type="submit">Log in</button>
      <p class="status" id="status"></p>
    </form>
    <p class="hint">No account yet? <a href="/register">Create one</a>.</p>
  </main>
  <script>
    const form = document.getElementById('login-form');
    const status = document.getElementById('status');

    form.addEventListener('submit', async (event) => {
      event.preventDefault();
      const username = document.getElementById('username').value.trim();
      const password = document.getElementById('password').value;
      const remember = document.getElementById('remember').checked;

      if (!username || !password) {
        status.textContent = 'Please enter username and password.';
        status.dataset.type = 'error';
        return;
      }

      try {
        const response = await fetch('/api/login', {
          method: 'POST',
          headers: { 'Content-Type': 'application/json' },
          body: JSON.stringify({ username, password, remember }),
        });
        const body = await response.json().catch(() => ({}));
        if (!response.ok || body.ok !== true) {
          status.textContent = body.message || 'Login failed. Please try again.';
          status.dataset.type = 'error';
          return;
        }
        window.location.href = '/dashboard';
      } catch (err) {
        status.textContent = 'Could not reach the server. Please try again.';
        status.dataset.type = 'error';
      }
    });
  </script>
</body>
</html>
"#;

const REGISTER_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Wina Bwangu — Register</title>
  <style>{{CSS}}</style>
</head>
<body>
  <main class="app" style="width: min(440px, 100%)">
    <header>
      <h1>Create account</h1>
      <p class="subtitle">Register a booth operator</p>
    </header>
    <form id="register-form">
      <label>Username
        <input type="text" id="reg-username" autocomplete="username" />
      </label>
      <label>Password
        <input type="password" id="reg-password" autocomplete="new-password" />
      </label>
      <button type="submit">Register</button>
      <p class="status" id="status"></p>
    </form>
    <p class="hint">Already registered? <a href="/">Log in</a>.</p>
  </main>
  <script>
    const form = document.getElementById('register-form');
    const status = document.getElementById('status');

    form.addEventListener('submit', async (event) => {
      event.preventDefault();
      const username = document.getElementById('reg-username').value.trim();
      const password = document.getElementById('reg-password').value;

      if (!username || !password) {
        status.textContent = 'Please enter username and password.';
        status.dataset.type = 'error';
        return;
      }

      try {
        const response = await fetch('/api/register', {
          method: 'POST',
          headers: { 'Content-Type': 'application/json' },
          body: JSON.stringify({ username, password }),
        });
        const body = await response.json().catch(() => ({}));
        if (!response.ok || body.ok !== true) {
          status.textContent = body.message || 'Registration failed. Please try again.';
          status.dataset.type = 'error';
          return;
        }
        status.textContent = 'Account created. Redirecting to login…';
        status.dataset.type = 'ok';
        setTimeout(() => { window.location.href = '/'; }, 600);
      } catch (err) {
        status.textContent = 'Could not reach the server. Please try again.';
        status.dataset.type = 'error';
      }
    });
  </script>
</body>
</html>
"#;

const DASHBOARD_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Wina Bwangu — Dashboard</title>
  <style>{{CSS}}</style>
</head>
<body>
  <main class="app">
    <header>
      <h1>Transaction Dashboard</h1>
      <p class="subtitle">Record transactions against per-service monthly limits</p>
    </header>

    <section class="panel">
      <h2>New transaction</h2>
      <form id="trans-form">
        <label>Booth
          <select id="booth-select">
            <option value="">Choose Booth</option>
          </select>
        </label>
        <p class="info" id="location-display"></p>
        <label>Service
          <select id="service-select" disabled>
            <option value="">Choose Service</option>
          </select>
        </label>
        <p class="info" id="revenue-display"></p>
        <label>Amount (K)
          <input type="text" id="amount-input" inputmode="decimal" placeholder="0.00" />
        </label>
        <button type="submit">Submit transaction</button>
        <p class="status" id="status"></p>
        <div class="tax-bar" id="tax-bar" role="progressbar" aria-valuemin="0" aria-valuemax="100">
          <div class="tax-bar-fill" id="tax-bar-fill"></div>
        </div>
        <p class="info" id="tax-amount"></p>
      </form>
    </section>

    <section class="panel">
      <h2>Service usage</h2>
      <table id="cum-table">
        <thead>
          <tr><th>Service</th><th>Monthly Limit</th><th>Used</th><th>Remaining</th><th>Tax Collected</th></tr>
        </thead>
        <tbody>
{{SERVICE_ROWS}}
        </tbody>
      </table>
    </section>

    <section class="panel">
      <h2>Booth revenue</h2>
      <table id="revenue-table">
        <thead>
          <tr><th>Booth</th><th>Location</th><th>Revenue</th></tr>
        </thead>
        <tbody>
{{BOOTH_ROWS}}
        </tbody>
      </table>
    </section>

    <section class="panel">
      <h2>Service frequency</h2>
      <table id="freq-table">
        <thead>
          <tr><th>Booth</th><th>Service</th><th>Transactions</th></tr>
        </thead>
        <tbody>
{{FREQ_ROWS}}
        </tbody>
      </table>
    </section>

    <section class="panel">
      <h2>Revenue vs tax</h2>
      <canvas id="revenuePie" width="280" height="280"></canvas>
      <div class="legend">
        <span><span class="swatch" style="background:#059669"></span>Total Revenue {{TOTAL_REVENUE_LABEL}}</span>
        <span><span class="swatch" style="background:#dc2626"></span>Tax Revenue {{TOTAL_TAX_LABEL}}</span>
      </div>
    </section>
  </main>

  <script>
    const servicesPerBooth = {{SERVICES_PER_BOOTH}};
    const boothLocations = {{BOOTH_LOCATIONS}};
    const serviceState = {{SERVICE_STATE}};
    const boothRevenue = {{BOOTH_REVENUE}};
    const totalRevenue = {{TOTAL_REVENUE}};
    const totalTax = {{TOTAL_TAX}};

    const boothSelect = document.getElementById('booth-select');
    const serviceSelect = document.getElementById('service-select');
    const locationDisplay = document.getElementById('location-display');
    const revenueDisplay = document.getElementById('revenue-display');
    const amountInput = document.getElementById('amount-input');
    const status = document.getElementById('status');
    const taxBar = document.getElementById('tax-bar');
    const taxBarFill = document.getElementById('tax-bar-fill');
    const taxAmount = document.getElementById('tax-amount');

    const required = [boothSelect, serviceSelect, locationDisplay, revenueDisplay,
      amountInput, status, taxBar, taxBarFill, taxAmount];
    if (required.some((el) => el === null)) {
      console.error('Critical dashboard elements are missing; refusing to initialize.');
      throw new Error('dashboard initialization failed');
    }

    for (const booth of Object.keys(servicesPerBooth)) {
      const option = document.createElement('option');
      option.value = booth;
      option.textContent = booth + ' — ' + boothLocations[booth];
      boothSelect.appendChild(option);
    }

    boothSelect.addEventListener('change', () => {
      const booth = boothSelect.value;
      serviceSelect.innerHTML = "<option value=''>Choose Service</option>";
      revenueDisplay.textContent = '';

      if (booth && servicesPerBooth[booth]) {
        locationDisplay.textContent = 'Location: ' + boothLocations[booth];
        for (const service of servicesPerBooth[booth]) {
          const option = document.createElement('option');
          option.value = service;
          option.textContent = service;
          serviceSelect.appendChild(option);
        }
        serviceSelect.disabled = false;
      } else {
        locationDisplay.textContent = '';
        serviceSelect.disabled = true;
      }
    });

    serviceSelect.addEventListener('change', () => {
      const booth = boothSelect.value;
      const service = serviceSelect.value;
      if (booth && service && serviceState[service]) {
        const info = serviceState[service];
        revenueDisplay.innerHTML =
          '<strong>Current Booth Revenue:</strong> ' + boothRevenue[booth] + '<br>' +
          '<strong>' + service + ' Limit:</strong> ' + info.limit_label + '<br>' +
          '<strong>Used:</strong> ' + info.used_label + '<br>' +
          '<strong>Remaining:</strong> ' + info.remaining_label;
      } else {
        revenueDisplay.textContent = '';
      }
    });

    document.getElementById('trans-form').addEventListener('submit', async (event) => {
      event.preventDefault();
      const booth = boothSelect.value;
      const service = serviceSelect.value;
      const amount = parseFloat(amountInput.value);

      if (!booth || !service || isNaN(amount) || amount <= 0) {
        status.textContent = 'Please complete all fields with valid values.';
        status.dataset.type = 'error';
        return;
      }

      try {
        const response = await fetch('/api/transactions', {
          method: 'POST',
          headers: { 'Content-Type': 'application/json' },
          body: JSON.stringify({ booth, service, amount }),
        });
        const body = await response.json().catch(() => ({}));
        if (!response.ok || body.ok !== true) {
          status.textContent = body.message || 'Transaction failed. Please try again.';
          status.dataset.type = 'error';
          return;
        }

        status.textContent = 'Transaction ' + body.id + ' submitted successfully.';
        status.dataset.type = 'ok';
        taxBar.style.display = 'block';
        taxBarFill.style.width = body.tax_percent + '%';
        taxBar.setAttribute('aria-valuenow', body.tax_percent.toFixed(0));
        taxAmount.textContent =
          'Tax: K' + body.tax.toFixed(2) + ' (' + body.tax_percent.toFixed(1) + '% of K1000 threshold)';

        // Reload so every table and the chart are regenerated server-side.
        setTimeout(() => window.location.reload(), 600);
      } catch (err) {
        status.textContent = 'Could not reach the server. Please try again.';
        status.dataset.type = 'error';
      }
    });

    const canvas = document.getElementById('revenuePie');
    const ctx = canvas.getContext('2d');
    const total = totalRevenue + totalTax;
    if (total > 0) {
      const centerX = canvas.width / 2;
      const centerY = canvas.height / 2;
      const radius = Math.min(centerX, centerY) - 8;
      const slices = [
        { value: totalRevenue, color: '#059669' },
        { value: totalTax, color: '#dc2626' },
      ];
      let start = -Math.PI / 2;
      for (const slice of slices) {
        const angle = (slice.value / total) * Math.PI * 2;
        ctx.beginPath();
        ctx.moveTo(centerX, centerY);
        ctx.arc(centerX, centerY, radius, start, start + angle);
        ctx.closePath();
        ctx.fillStyle = slice.color;
        ctx.fill();
        start += angle;
      }
    } else {
      ctx.fillStyle = '#8a978f';
      ctx.font = '14px "Trebuchet MS", sans-serif';
      ctx.textAlign = 'center';
      ctx.fillText('No revenue recorded yet', canvas.width / 2, canvas.height / 2);
    }
  </script>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::tax_for;
    use crate::models::{Service, TransactionRecord};

    fn sample_aggregates() -> Aggregates {
        let amount = Money::from_kwacha(1000);
        let record = TransactionRecord {
            id: "WB0000001".to_string(),
            booth: Booth::Wina3,
            service: Service::Zanaco,
            amount,
            tax: tax_for(amount),
            location: Booth::Wina3.location().to_string(),
            timestamp: "2026-08-01T00:00:00Z".to_string(),
        };
        Aggregates::replay(std::slice::from_ref(&record))
    }

    #[test]
    fn login_page_prefills_remembered_user() {
        let page = render_login(Some("alice"));
        assert!(page.contains("value=\"alice\""));
        assert!(page.contains("checked"));

        let fresh = render_login(None);
        assert!(fresh.contains("value=\"\""));
    }

    #[test]
    fn remembered_user_is_html_escaped() {
        let page = render_login(Some("a\"<script>"));
        assert!(!page.contains("a\"<script>"));
        assert!(page.contains("a&quot;&lt;script&gt;"));
    }

    #[test]
    fn dashboard_renders_every_service_row() {
        let page = render_dashboard(&sample_aggregates());
        for service in Service::ALL {
            assert!(page.contains(service.name()), "missing {service}");
        }
        assert!(page.contains("K80,000"));
        assert!(page.contains("K1000.00"));
        assert!(page.contains("K50.00"));
    }

    #[test]
    fn dashboard_embeds_booth_service_mapping() {
        let page = render_dashboard(&Aggregates::default());
        assert!(page.contains("\"Wina4\":[\"Airtel Money\",\"MTN Money\",\"Zamtel Money\"]"));
        assert!(page.contains("No transactions yet"));
    }

    #[test]
    fn no_placeholders_survive_rendering() {
        for page in [
            render_login(Some("alice")),
            render_register(),
            render_dashboard(&sample_aggregates()),
        ] {
            assert!(!page.contains("{{"), "unreplaced placeholder in page");
        }
    }
}
